//! # transflux-network
//!
//! 네트워크 어댑터.
//! 토렌트 데몬 폴링(Transmission JSON-RPC)과 시계열 저장소(InfluxDB v1 HTTP)를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use transflux_network::influx::InfluxClient;
//! use transflux_network::transmission::TransmissionRpcClient;
//!
//! let store = InfluxClient::new(&config.influxdb)?;
//! let rpc = TransmissionRpcClient::new(&config.transmission_clients[0])?;
//! ```

pub mod influx;
pub mod line_protocol;
pub mod transmission;
