use anyhow::ensure;

use crate::strategy::Strategy;
use crate::system::ElevatorSystem;
use crate::types::request::RawRequest;

/// Feeds `requests` to `system` in order and renders the state after each
/// one, followed by a blank line. A rejected request leaves the state as it
/// was, and that unchanged state is rendered so the output stays aligned
/// with the trace.
pub fn replay<ST, I>(system: &mut ElevatorSystem<ST>, requests: I) -> String
where
    ST: Strategy,
    I: IntoIterator<Item = RawRequest>,
{
    let mut rendered = String::new();
    for request in requests {
        // Rejections are logged by the system itself.
        let _ = system.take_request(&request);
        rendered.push_str(&format!("{}\n", system.snapshot()));
    }
    rendered
}

/// Compares replay output with a recorded expectation, naming the first
/// differing line.
pub fn verify(rendered: &str, expected: &str) -> anyhow::Result<()> {
    if let Some((n, (got, want))) = rendered
        .lines()
        .zip(expected.lines())
        .enumerate()
        .find(|(_, (got, want))| got != want)
    {
        anyhow::bail!("line {}: got {got:?}, expected {want:?}", n + 1);
    }
    ensure!(
        rendered.lines().count() == expected.lines().count(),
        "got {} lines, expected {}",
        rendered.lines().count(),
        expected.lines().count()
    );
    Ok(())
}
