//! Integration tests for the access gate under concurrent callers.

use std::collections::HashSet;
use std::sync::Arc;

use stockroom_auth::{
    AccessGate, AuthError, CredentialHasher, HasherConfig, IdentityStore,
    SessionAuthority, SessionConfig,
};

fn gate() -> AccessGate {
    let hasher =
        CredentialHasher::new(&HasherConfig::minimal()).expect("valid params");
    AccessGate::new(
        Arc::new(IdentityStore::new(hasher)),
        Arc::new(SessionAuthority::new(SessionConfig::default())),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_get_independent_sessions() {
    let gate = gate();
    let (user, _) = gate
        .register("a@x.com".into(), "pw1".into())
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let gate = gate.clone();
        tasks.push(tokio::spawn(async move {
            gate.authenticate("a@x.com".into(), "pw1".into()).await
        }));
    }
    let mut tokens = Vec::new();
    for task in tasks {
        let (logged_in, session) = task.await.unwrap().unwrap();
        assert_eq!(logged_in, user);
        tokens.push(session.token);
    }

    let unique: HashSet<_> = tokens.iter().collect();
    assert_eq!(unique.len(), tokens.len(), "every login gets its own token");

    // Ending one session leaves the rest alive.
    gate.logout(&tokens[0]);
    assert!(matches!(
        gate.require_caller(&tokens[0]),
        Err(AuthError::Unauthorized)
    ));
    for token in &tokens[1..] {
        assert_eq!(gate.require_caller(token).unwrap(), user.id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_unique_ids() {
    let gate = gate();

    let mut tasks = Vec::new();
    for n in 0..10 {
        let gate = gate.clone();
        tasks.push(tokio::spawn(async move {
            gate.register(format!("user{n}@x.com"), "pw".into()).await
        }));
    }
    let mut ids = HashSet::new();
    for task in tasks {
        let (user, session) = task.await.unwrap().unwrap();
        assert_eq!(gate.require_caller(&session.token).unwrap(), user.id);
        ids.insert(user.id);
    }

    assert_eq!(ids.len(), 10);
    assert_eq!(gate.identities().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_username_registers_once() {
    let gate = gate();

    let mut tasks = Vec::new();
    for _ in 0..6 {
        let gate = gate.clone();
        tasks.push(tokio::spawn(async move {
            gate.register("same@x.com".into(), "pw".into()).await
        }));
    }
    let mut ok = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AuthError::DuplicateIdentity(name)) => {
                assert_eq!(name, "same@x.com");
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(gate.identities().len(), 1);
}
