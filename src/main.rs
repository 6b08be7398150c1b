use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let mode = themekeeper::run(std::env::args().skip(1)).context("themekeeper failed")?;
    println!("{mode}");
    Ok(())
}
