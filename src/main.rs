use std::io;

use stepviz::{AppConfig, AppError, Player};
use stepviz_scenarios::{Catalog, ScenarioOptions};

const USAGE: &str = "Uso: stepviz list\n       stepviz play [<id>] [--auto] [--key <N>] [--strategy <heap|clustered|nonclustered|covering>] \
                     [--predicate <equals:D|from:D|between:D..D>] [--join <inner|left|right|full|cross>] \
                     [--fill <lastvalue|linear>] [--window <row_number|rank|dense_rank|lead|lag>] \
                     [--partition <true|false>] [--count <star|col>]";

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("[stepviz] {e}");
        if matches!(e, AppError::Usage(_)) {
            eprintln!("{USAGE}");
        }
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let catalog = Catalog::builtin();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("list") => {
            for entry in catalog.iter() {
                println!("{:<20} {}", entry.id, entry.title);
            }
            Ok(())
        }
        Some("play") => play(&catalog, &config, &args[2..]),
        Some(other) => Err(AppError::Usage(format!("comando desconocido '{other}'"))),
        None => Err(AppError::Usage("falta el comando".into())),
    }
}

fn play(catalog: &Catalog, config: &AppConfig, args: &[String]) -> Result<(), AppError> {
    let mut id: Option<String> = None;
    let mut auto = false;
    let mut options = ScenarioOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--auto" => auto = true,
            flag @ ("--key" | "--strategy" | "--predicate" | "--join" | "--fill" | "--window" | "--partition"
                    | "--count") => {
                i += 1;
                let value = args.get(i)
                                .ok_or_else(|| AppError::Usage(format!("{flag} requiere un valor")))?;
                options.set(&flag[2..], value)?;
            }
            other if other.starts_with("--") => return Err(AppError::Usage(format!("opción desconocida '{other}'"))),
            other => {
                if id.is_some() {
                    return Err(AppError::Usage(format!("argumento extra '{other}'")));
                }
                id = Some(other.to_string());
            }
        }
        i += 1;
    }

    let id = id.unwrap_or_else(|| config.default_scenario.clone());
    let playable = catalog.open(&id, &options)?;
    let mut player = Player::new(playable, config);
    let mut stdout = io::stdout().lock();
    if auto {
        player.run_auto(&mut stdout)
    } else {
        player.run_interactive(io::stdin().lock(), &mut stdout)
    }
}
