mod cli;
mod constants;
mod domain;
mod error;
mod layout;
mod report;
mod storage;
mod timecode;

fn main() {
    cli::run_cli();
}
