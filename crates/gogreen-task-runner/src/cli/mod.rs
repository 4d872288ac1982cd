/*
[INPUT]:  Subcommand dispatch from main
[OUTPUT]: Interactive and init flows
[POS]:    CLI layer - module wiring
[UPDATE]: When adding CLI flows
*/

pub mod init;
pub mod interactive;
