//! stepviz: reproductor de escenarios paso a paso.
//!
//! - `config`: variables de entorno del host.
//! - `errors`: errores del host y su código de salida.
//! - `player`: bucle de texto plano sobre un `Playable`.

pub mod config;
pub mod errors;
pub mod player;

pub use config::AppConfig;
pub use errors::AppError;
pub use player::{render_frame, Command, Player};
