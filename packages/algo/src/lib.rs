//! # danci-srs - 单词复习调度核心库
//!
//! 本 crate 提供纯 Rust 实现的间隔重复调度算法:
//!
//! - **SM-2 Scheduler** - 统一的 SM-2 调度策略 (唯一实现)
//! - **Rating Taxonomy** - Again / Hard / Good / Easy 四级评分
//! - **Batch Scheduling** - 基于 Rayon 的并行批量调度
//! - **Learner Simulation** - 可复现的学习者模拟 (ChaCha8 种子)
//!
//! ## 设计理念
//!
//! - **纯函数** - 调度器无 I/O、无全局时钟，`now` 由调用方注入
//! - **全函数** - 任何状态与评分组合都有结果，异常输入会被修正而不是拒绝
//! - **状态派生** - `learning` / `learned` 由 repetitions 推导，从不单独存储
//!
//! ## 模块结构
//!
//! - [`scheduler`] - 下次复习计算
//! - [`rating`] - 评分、标签、颜色、质量映射
//! - [`batch`] - 并行批量调度
//! - [`simulate`] - 学习者模拟
//! - [`sanitize`] - 输入修正与取整
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::Utc;
//! use danci_srs::{compute_next_review, MemoryState, Rating, LearningStatus};
//!
//! let now = Utc::now();
//! let first = compute_next_review(&MemoryState::default(), Rating::Good, now);
//! assert_eq!(first.interval_days, 1);
//!
//! let second = compute_next_review(&first, Rating::Good, now);
//! assert_eq!(second.interval_days, 6);
//! assert_eq!(second.status(), LearningStatus::Learning);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod batch;
pub mod rating;
pub mod sanitize;
pub mod scheduler;
pub mod simulate;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出评分
pub use rating::{color_of, label_of, Rating, RatingColor, RatingError};

/// 重新导出调度器
pub use scheduler::{compute_next_review, preview_ratings};

pub use batch::{schedule_batch, BatchReview};
pub use simulate::{simulate, LearnerProfile, SimulationStep};
