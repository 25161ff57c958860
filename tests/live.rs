//! Live integration tests against a real ALKS broker.
//!
//! These tests are ignored by default. Run with:
//! ```bash
//! # Set environment variables first
//! export ALKS_URL=https://alks.example.com/rest
//! export ALKS_USERNAME=your-username
//! export ALKS_PASSWORD=your-password
//! export ALKS_ACCOUNT="012345678910/ALKSAdmin - awstest123"
//! export ALKS_ROLE=Admin
//!
//! cargo test --test live -- --ignored --nocapture
//! ```

use rs_alks::Client;

/// Create client using settings from environment variables
fn live_client() -> Client {
    Client::from_env().expect("failed to create client from environment")
}

#[tokio::test]
#[ignore = "requires a reachable ALKS broker and credentials"]
async fn live_get_accounts() {
    let client = live_client();

    let resp = client.get_accounts().await.expect("get_accounts failed");

    println!("=== Accounts ===");
    for account in &resp.accounts {
        println!("{} ({}) iam={}", account.account, account.role, account.iam_active);
    }

    assert!(!resp.accounts.is_empty(), "caller should see at least one account");
}

#[tokio::test]
#[ignore = "requires a reachable ALKS broker and credentials"]
async fn live_session_round_trip() {
    let client = live_client();

    let session = client.create_session(1).await.expect("create_session failed");
    println!("=== Session ===");
    println!("AccessKey: {}", session.access_key);
    println!("Expires: {}", session.expires);
    assert!(!session.access_key.is_empty());
    assert!(!session.is_expired());

    let client = client
        .with_credentials(session.credentials())
        .expect("session credentials should be valid headers");
    let resp = client.get_login_role().await.expect("get_login_role failed");

    let login_role = resp.login_role.expect("broker should report a login role");
    println!("=== Login Role ===");
    println!("Account: {}", login_role.account);
    println!("Role: {}", login_role.role);
    assert!(!login_role.role.is_empty());
}

#[tokio::test]
#[ignore = "requires a reachable ALKS broker and credentials"]
async fn live_get_missing_role() {
    let client = live_client();

    let resp = client
        .get_iam_role("rs-alks-live-test-role-that-does-not-exist")
        .await;

    println!("=== GetIamRole (missing) ===");
    println!("{:?}", resp);
}
