fn main() -> anyhow::Result<()> {
    dlgkit::cli::run_cli()
}
