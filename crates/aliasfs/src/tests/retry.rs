// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::{RetryExecutor, RetryPolicy};

fn executor(max_retries: usize) -> RetryExecutor {
    RetryExecutor::new(RetryPolicy::new(max_retries, Duration::from_millis(1)).unwrap())
}

/// Run an operation that fails its first `failures` attempts. Returns the
/// outcome and how many attempts were made.
async fn run_flaky(executor: RetryExecutor, failures: usize) -> (Result<usize>, usize) {
    let attempts = AtomicUsize::new(0);
    let result = executor
        .run(|| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt <= failures {
                    Err(Error::io(
                        "/flaky",
                        io::Error::new(io::ErrorKind::PermissionDenied, format!("attempt {attempt}")),
                    ))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
    (result, attempts.load(Ordering::SeqCst))
}

#[tokio::test]
async fn test_no_retries_needed() {
    let (result, attempts) = run_flaky(executor(0), 0).await;
    assert_eq!(result.unwrap(), 1);
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn test_one_retry() {
    let (result, attempts) = run_flaky(executor(1), 1).await;
    assert_eq!(result.unwrap(), 2);
    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn test_recovers_on_last_retry() {
    let (result, attempts) = run_flaky(executor(10), 10).await;
    assert_eq!(result.unwrap(), 11);
    assert_eq!(attempts, 11);
}

#[tokio::test]
async fn test_zero_retries_fails_once() {
    let (result, attempts) = run_flaky(executor(0), 1).await;
    assert!(result.is_err());
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn test_exhausted_returns_last_error() {
    let (result, attempts) = run_flaky(executor(5), usize::MAX).await;
    assert_eq!(attempts, 6);

    let err = result.unwrap_err();
    assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    assert!(err.to_string().contains("attempt 6"), "got {err}");
}

#[tokio::test]
async fn test_invalid_argument_is_not_retried() {
    let attempts = AtomicUsize::new(0);
    let result: Result<()> = executor(10)
        .run(|| {
            let _ = attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::invalid_argument("bad alias")) }
        })
        .await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_delay_rejected() {
    assert!(matches!(
        RetryPolicy::new(3, Duration::ZERO),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_policy_defaults() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries(), 10);
    assert_eq!(policy.delay(), Duration::from_millis(50));

    let contended = RetryPolicy::contended();
    assert_eq!(contended.max_retries(), 150);
    assert_eq!(contended.delay(), Duration::from_millis(50));
}
