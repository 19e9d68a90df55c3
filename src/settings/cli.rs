use super::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(long, env = "CREDENTIAL_GATE_SETTINGS")]
    pub settings: Option<String>,
}
