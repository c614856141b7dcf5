//! 元素过期重试

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RetrySettings;
use crate::error::{NavError, NavResult};

/// 过期重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleRetryPolicy {
    /// 首次执行之后最多再执行的次数
    pub max_retries: u32,
    /// 两次执行之间的停顿
    pub pause: Duration,
}

impl Default for StaleRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            pause: Duration::from_millis(500),
        }
    }
}

impl From<&RetrySettings> for StaleRetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.stale_retries,
            pause: Duration::from_millis(settings.stale_pause_ms),
        }
    }
}

/// 仅在 `StaleAnchor` 时重新执行 `operation`
///
/// 其他错误立即返回；重试耗尽后返回超时类的 `StaleRetriesExhausted`。
pub async fn retry_on_staleness<T, F, Fut>(
    policy: StaleRetryPolicy,
    anchor: &str,
    mut operation: F,
) -> NavResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = NavResult<T>>,
{
    let total_attempts = policy.max_retries + 1;

    for attempt in 1..=total_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("锚点 {} 在第 {} 次尝试时成功", anchor, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_stale() => {
                if attempt == total_attempts {
                    break;
                }
                warn!(
                    "锚点 {} 已失效 (尝试 {}/{}), {:?} 后重试...",
                    anchor, attempt, total_attempts, policy.pause
                );
                sleep(policy.pause).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(NavError::StaleRetriesExhausted {
        anchor: anchor.to_string(),
        attempts: total_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> StaleRetryPolicy {
        StaleRetryPolicy {
            max_retries,
            pause: Duration::from_millis(1),
        }
    }

    /// 前 `stale_failures` 次返回过期错误，之后成功
    async fn run_with_failures(max_retries: u32, stale_failures: u32) -> (NavResult<u32>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_on_staleness(policy(max_retries), "template.quiz", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= stale_failures {
                    Err(NavError::StaleAnchor {
                        anchor: "template.quiz".into(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_succeeds_after_k_plus_one_attempts() {
        for k in 0..=3 {
            let (result, calls) = run_with_failures(3, k).await;
            assert_eq!(result.unwrap(), k + 1);
            assert_eq!(calls, k + 1);
        }
    }

    #[tokio::test]
    async fn test_exhaustion_escalates_to_timeout_class() {
        let (result, calls) = run_with_failures(3, 4).await;
        let err = result.unwrap_err();
        assert!(err.is_timeout_class());
        assert!(matches!(
            err,
            NavError::StaleRetriesExhausted { attempts: 4, .. }
        ));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_non_stale_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: NavResult<()> = retry_on_staleness(policy(3), "question.add", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(NavError::AnchorTimeout {
                    anchor: "question.add".into(),
                    timeout: Duration::from_millis(5),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(NavError::AnchorTimeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = RetrySettings {
            stale_retries: 5,
            stale_pause_ms: 20,
            poll_interval_ms: 10,
        };
        let policy = StaleRetryPolicy::from(&settings);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.pause, Duration::from_millis(20));
    }
}
