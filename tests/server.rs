//! Fixture server lifecycle tests

use tempfile::TempDir;

use visual_smoke::FixtureServer;

/// Find a free loopback port for test isolation; the production default
/// is the fixed port 4444
fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind to find free port")
        .local_addr()
        .expect("failed to get local addr")
        .port()
}

fn static_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("index.html"), "<html>smoke fixture</html>").unwrap();
    std::fs::create_dir(tmp.path().join("app")).unwrap();
    std::fs::write(tmp.path().join("app").join("page.html"), "<html>app page</html>").unwrap();
    tmp
}

#[tokio::test]
async fn serves_static_assets_over_loopback() {
    let dist = static_fixture();
    let mut server = FixtureServer::new(dist.path().to_path_buf(), free_port());
    server.start().await.unwrap();

    let index = reqwest::get(format!("{}index.html", server.base_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(index.contains("smoke fixture"));

    let nested = reqwest::get(format!("{}app/page.html", server.base_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(nested.contains("app page"));

    server.stop().await;
}

#[tokio::test]
async fn stop_without_start_is_a_noop() {
    let dist = static_fixture();
    let mut server = FixtureServer::new(dist.path().to_path_buf(), free_port());
    server.stop().await;
    server.stop().await;
}

#[tokio::test]
async fn start_twice_keeps_the_server_running() {
    let dist = static_fixture();
    let mut server = FixtureServer::new(dist.path().to_path_buf(), free_port());
    server.start().await.unwrap();
    server.start().await.unwrap();

    let status = reqwest::get(format!("{}index.html", server.base_url()))
        .await
        .unwrap()
        .status();
    assert!(status.is_success());

    server.stop().await;
}

#[tokio::test]
async fn stop_releases_the_port() {
    let dist = static_fixture();
    let port = free_port();

    let mut server = FixtureServer::new(dist.path().to_path_buf(), port);
    server.start().await.unwrap();
    server.stop().await;

    // The port must be bindable again once the suite is done with it.
    let mut replacement = FixtureServer::new(dist.path().to_path_buf(), port);
    replacement.start().await.unwrap();
    replacement.stop().await;
}
