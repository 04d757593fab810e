//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use subdomain_orchestrator_provider::HetznerProvider;

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping: environment variable {} is not set", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Unique throwaway label so parallel runs never collide.
pub fn generate_test_subdomain() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("itest-{}", &uuid.to_string()[..8])
}

/// Provider built from `HETZNER_DNS_API_TOKEN`, `HETZNER_DNS_ZONE_ID` and `TEST_ZONE_NAME`.
pub fn hetzner_from_env() -> Option<HetznerProvider> {
    let token = env::var("HETZNER_DNS_API_TOKEN").ok()?;
    let zone_id = env::var("HETZNER_DNS_ZONE_ID").ok()?;
    let zone_name = env::var("TEST_ZONE_NAME").ok()?;

    HetznerProvider::builder(Some(token), Some(zone_id))
        .zone_name(zone_name)
        .build()
        .ok()
}
