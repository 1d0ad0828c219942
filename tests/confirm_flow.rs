//! Integration tests for step-up confirmation in front of a trigger chain.

mod common;

use common::{dispatcher_from, request};
use slashgate::triggers::confirm::totp_code;
use slashgate::{Dispatched, Dispatcher};
use std::time::Duration;

const PROMPT: &str = "please input number for confirm";

fn confirm_dispatcher(expiry: u64) -> Dispatcher {
    let toml = format!(
        r#"
[triggers.reboot]
word = "!reboot"
drivers = ["gogap-confirm", "gogap-greeter"]

[triggers.reboot.gogap-confirm]
expiry = {expiry}

[triggers.reboot.gogap-greeter]
name = "robot A"
"#
    );
    dispatcher_from(&toml).1
}

fn text_of(dispatched: Dispatched) -> String {
    match dispatched {
        Dispatched::Message(resp) => resp.text,
        Dispatched::NoContent => panic!("expected a message"),
    }
}

/// Send `!reboot` for `user` and return the issued code.
async fn challenge(dispatcher: &Dispatcher, user: &str) -> String {
    let text = text_of(dispatcher.handle(request("!reboot", "!reboot now", user)).await);
    let code = text
        .strip_prefix(PROMPT)
        .and_then(|rest| rest.strip_prefix(": "))
        .unwrap_or_else(|| panic!("unexpected prompt: {text}"));
    code.to_string()
}

async fn reply(dispatcher: &Dispatcher, user: &str, code: &str) -> String {
    text_of(
        dispatcher
            .handle(request("!reboot", &format!("!reboot {code}"), user))
            .await,
    )
}

#[tokio::test]
async fn test_confirmed_request_runs_chain() {
    let dispatcher = confirm_dispatcher(10);
    let code = challenge(&dispatcher, "zeal").await;
    assert_eq!(reply(&dispatcher, "zeal", &code).await, "Hello zeal I am robot A");
}

#[tokio::test]
async fn test_code_is_single_use() {
    let dispatcher = confirm_dispatcher(10);
    let code = challenge(&dispatcher, "zeal").await;
    assert_eq!(reply(&dispatcher, "zeal", &code).await, "Hello zeal I am robot A");

    // Nothing is pending any more, so the same code starts a new challenge.
    assert!(reply(&dispatcher, "zeal", &code).await.starts_with(PROMPT));
}

#[tokio::test]
async fn test_wrong_code_and_bad_input() {
    let dispatcher = confirm_dispatcher(10);

    let code: u32 = challenge(&dispatcher, "zeal").await.parse().unwrap();
    let wrong = code % 99_998 + 1;
    assert_eq!(reply(&dispatcher, "zeal", &wrong.to_string()).await, "bad confirm number");

    challenge(&dispatcher, "zeal").await;
    assert_eq!(reply(&dispatcher, "zeal", "yes").await, "please input number");

    // The failed attempt consumed the challenge.
    assert!(reply(&dispatcher, "zeal", "yes").await.starts_with(PROMPT));
}

#[tokio::test]
async fn test_expired_challenge_is_reissued() {
    let dispatcher = confirm_dispatcher(1);
    let code = challenge(&dispatcher, "zeal").await;

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(reply(&dispatcher, "zeal", &code).await.starts_with(PROMPT));
}

#[tokio::test]
async fn test_users_confirm_independently() {
    let dispatcher = confirm_dispatcher(10);
    let alice_code = challenge(&dispatcher, "alice").await;

    // bob has nothing pending: his message is a fresh challenge
    assert!(reply(&dispatcher, "bob", &alice_code).await.starts_with(PROMPT));

    assert_eq!(
        reply(&dispatcher, "alice", &alice_code).await,
        "Hello alice I am robot A"
    );
}

#[tokio::test]
async fn test_totp_confirmation() {
    const SECRET: &[u8] = b"12345678901234567890";
    let (_, dispatcher) = dispatcher_from(
        r#"
[triggers.reboot]
word = "!reboot"
drivers = ["gogap-confirm-totp", "gogap-greeter"]

[triggers.reboot.gogap-confirm-totp]
prompt = "otp please"

[triggers.reboot.gogap-confirm-totp.secrets.zeal]
user = "zeal"
secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ"

[triggers.reboot.gogap-greeter]
name = "robot A"
"#,
    );

    let prompt = text_of(dispatcher.handle(request("!reboot", "!reboot", "zeal")).await);
    assert_eq!(prompt, "otp please");

    let now = chrono::Utc::now().timestamp() as u64;
    let code = format!("{:06}", totp_code(SECRET, now / 30));
    assert_eq!(reply(&dispatcher, "zeal", &code).await, "Hello zeal I am robot A");

    let unknown = text_of(dispatcher.handle(request("!reboot", "!reboot", "mallory")).await);
    assert_eq!(unknown, "user totp secret not exist: mallory");
}
