//! `storyteller` command-line entry point.

fn main() -> anyhow::Result<()> {
    // `false`: the server reported a failure, already printed
    if !storyteller::cli::run()? {
        std::process::exit(1);
    }
    Ok(())
}
