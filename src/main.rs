use anyhow::Context;

fn main() -> anyhow::Result<gtk4::glib::ExitCode> {
    markmenu::run().context("markmenu failed to start")
}
