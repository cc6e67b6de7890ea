//! # 容量规划
//!
//! 在修改任何载体字节之前，判断载体能否容纳整个帧。

use crate::constants::BITS_PER_CARRIER_BYTE;
use crate::error::{Result, StegoError};
use crate::frame::FrameLayout;

/// 一次容量检查的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    /// 头部之后可用于嵌入的位数。
    pub available_bits: u64,
    /// 帧需要的位数。
    pub required_bits: u64,
}

impl CapacityReport {
    /// 嵌入帧之后仍未使用的位数。
    pub fn spare_bits(&self) -> u64 {
        self.available_bits - self.required_bits
    }
}

/// 检查 `carrier_capacity_bytes` 个载体字节 (已扣除头部) 是否足以容纳给定的帧。
///
/// # Errors
///
/// 容量不足时返回 [`StegoError::InsufficientCapacity`]，同时携带需求与可用位数。
pub fn check_capacity(
    carrier_capacity_bytes: u64,
    magic_len: u64,
    extension_len: u64,
    payload_len: u64,
) -> Result<CapacityReport> {
    let report = CapacityReport {
        available_bits: carrier_capacity_bytes * BITS_PER_CARRIER_BYTE,
        required_bits: FrameLayout::required_bits_for(magic_len, extension_len, payload_len),
    };

    log::debug!(
        "Capacity check: required {} bits, available {} bits",
        report.required_bits,
        report.available_bits
    );

    if report.available_bits < report.required_bits {
        return Err(StegoError::InsufficientCapacity {
            required_bits: report.required_bits,
            available_bits: report.available_bits,
        });
    }

    Ok(report)
}
