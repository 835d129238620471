//! # transflux-app
//!
//! TRANSFLUX 수집기 애플리케이션 레이어.
//! 어댑터 와이어링, 수집 루프, 종료 처리를 담당한다.

pub mod collector;
pub mod dry_run;
pub mod lifecycle;
