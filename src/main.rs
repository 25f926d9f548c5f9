fn main() -> anyhow::Result<()> {
    environ_monitor::run()
}
