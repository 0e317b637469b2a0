use clap::ValueEnum;

mod config_cmd;
mod meal;

pub use config_cmd::ConfigCommand;
pub use meal::MealCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
