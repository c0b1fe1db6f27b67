//! Bucle de reproducción en texto plano sobre un `Playable`.
//!
//! Comandos por línea: `n` o línea vacía avanza, `r` reinicia, `q` sale.
//! Fin de entrada equivale a `q`.
use std::io::{BufRead, Write};

use log::{debug, info};
use stepviz_core::{FiredCue, Frame, Playable};

use crate::config::AppConfig;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Reset,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" | "n" | "next" => Some(Command::Next),
            "r" | "reset" => Some(Command::Reset),
            "q" | "quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Texto de un frame.
pub fn render_frame(frame: &Frame, show_bag: bool) -> String {
    let mut out = format!("[{}] {}", frame.progress_label, frame.narration.title);
    if let Some(tag) = &frame.tag {
        out.push_str(&format!(" ({})", tag.as_str()));
    }
    out.push('\n');
    out.push_str(&frame.narration.text);
    out.push('\n');
    for h in &frame.highlights {
        if !h.keys.is_empty() {
            out.push_str(&format!("  > {}: {}\n", h.region, h.keys.join(", ")));
        }
    }
    if show_bag {
        out.push_str(&format!("  bag: {}\n", frame.bag));
    }
    out
}

fn render_cue(cue: &FiredCue) -> String {
    format!("  @{}ms {} {}\n", cue.due_at_ms, cue.key, cue.payload)
}

/// Reproductor ligado a un escenario abierto.
pub struct Player<'a> {
    playable: Box<dyn Playable>,
    config: &'a AppConfig,
}

impl<'a> Player<'a> {
    pub fn new(playable: Box<dyn Playable>, config: &'a AppConfig) -> Self {
        Self { playable, config }
    }

    pub fn playable(&self) -> &dyn Playable {
        self.playable.as_ref()
    }

    fn write_frame<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        out.write_all(render_frame(&self.playable.frame(), self.config.show_bag).as_bytes())?;
        Ok(())
    }

    /// Dispara los cues vencidos y avanza el reloj de a `cue_tick_ms` hasta
    /// que no quede ninguno pendiente.
    fn drain_cues<W: Write>(&mut self, out: &mut W) -> Result<(), AppError> {
        let mut fired = self.playable.tick(0);
        loop {
            for cue in &fired {
                out.write_all(render_cue(cue).as_bytes())?;
            }
            if self.playable.pending_cues() == 0 {
                return Ok(());
            }
            fired = self.playable.tick(self.config.cue_tick_ms);
        }
    }

    fn step<W: Write>(&mut self, out: &mut W) -> Result<(), AppError> {
        let was_finished = self.playable.is_finished();
        self.playable.advance();
        if was_finished {
            writeln!(out, "(already complete; press r to replay)")?;
            return Ok(());
        }
        self.write_frame(out)?;
        self.drain_cues(out)?;
        // El fingerprint se imprime sólo al entrar en el paso terminal.
        if self.playable.is_finished() {
            self.write_fingerprint(out)?;
        }
        Ok(())
    }

    /// Avanza hasta el final imprimiendo cada frame.
    pub fn run_auto<W: Write>(&mut self, out: &mut W) -> Result<(), AppError> {
        self.write_frame(out)?;
        while !self.playable.is_finished() {
            self.step(out)?;
        }
        Ok(())
    }

    /// Lee comandos de `input` hasta `q` o fin de entrada.
    pub fn run_interactive<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), AppError> {
        self.write_frame(out)?;
        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Some(Command::Next) => self.step(out)?,
                Some(Command::Reset) => {
                    info!("reset de '{}'", self.playable.scenario_id());
                    self.playable.reset();
                    self.write_frame(out)?;
                }
                Some(Command::Quit) => break,
                None => {
                    debug!("comando desconocido: {:?}", line);
                    writeln!(out, "commands: n (next), r (reset), q (quit)")?;
                }
            }
        }
        Ok(())
    }

    fn write_fingerprint<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        if let Some(fp) = self.playable.run_fingerprint() {
            writeln!(out, "run fingerprint: {fp}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing() {
        assert_eq!(Command::parse(""), Some(Command::Next));
        assert_eq!(Command::parse(" n "), Some(Command::Next));
        assert_eq!(Command::parse("r"), Some(Command::Reset));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("x"), None);
    }
}
