/// Entry point for the container stats exporter.
///
/// Serves container cpu usage read from cgroups and pod log usage read from
/// the pod log directory as metrics over HTTP.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listen address
/// cannot be bound.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug CGROUP_ROOT=/sys/fs/cgroup/kubepods.slice cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    container_stats_exporter::run().await
}
