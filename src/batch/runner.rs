//! # 批量执行器
//!
//! 依次（或在线程池中）执行转换作业，处理目标冲突并汇总结果。
//!
//! ## 功能
//! - 默认严格顺序执行（宿主程序同一时刻只能打开一个文档）
//! - `jobs > 1` 时基于 rayon 的并行执行，目标相同的作业在同一工作线程中按顺序执行
//! - 冲突策略：OVERWRITE / FAIL / SKIP
//! - 单文档失败不影响批次；仅 FAIL 冲突中止整个批次
//! - 进度回调（单调不减）
//!
//! ## 依赖关系
//! - 被 `batch/pipeline.rs` 调用
//! - 使用 `converter/` 执行单文档转换
//! - 使用 `rayon` 进行并行计算

use crate::converter::{self, Converter, SaveContext};
use crate::error::{ConvertError, Result, VecpdfError};
use crate::models::{
    BatchSummary, CollisionPolicy, ConversionJob, ConversionOptions, FailureReason, JobStatus,
};

use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 作业完成回调
///
/// 每个作业进入终态后调用一次；`completed` 单调递增。
pub trait ProgressObserver: Sync {
    fn on_job_finished(&self, completed: usize, total: usize, job: &ConversionJob);
}

/// 不输出任何进度
pub struct SilentObserver;

impl ProgressObserver for SilentObserver {
    fn on_job_finished(&self, _completed: usize, _total: usize, _job: &ConversionJob) {}
}

/// 单个作业的处理结果
enum Outcome {
    Done(JobStatus),
    /// FAIL 策略下目标已存在
    Collision,
}

/// 批量执行器
pub struct BatchRunner<'a> {
    converter: &'a dyn Converter,
    options: ConversionOptions,
    collision: CollisionPolicy,
    /// 并行作业数
    jobs: usize,
    timeout: Option<Duration>,
}

impl<'a> BatchRunner<'a> {
    /// 创建新的批量执行器（`jobs == 0` 表示使用全部 CPU）
    pub fn new(converter: &'a dyn Converter, jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            converter,
            options: ConversionOptions::default(),
            collision: CollisionPolicy::default(),
            jobs,
            timeout: None,
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 执行全部作业
    ///
    /// FAIL 策略遇到已存在的目标时返回 `VecpdfError::Collision`，其中携带部分汇总。
    pub fn run(
        &self,
        jobs: Vec<ConversionJob>,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchSummary> {
        debug!(
            "Running {} job(s) with {} worker(s), collision policy {}",
            jobs.len(),
            self.jobs,
            self.collision
        );
        if self.jobs <= 1 || jobs.len() <= 1 {
            self.run_sequential(jobs, observer)
        } else {
            self.run_parallel(jobs, observer)
        }
    }

    fn run_sequential(
        &self,
        mut jobs: Vec<ConversionJob>,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchSummary> {
        let total = jobs.len();
        let cancel = AtomicBool::new(false);

        for i in 0..total {
            let outcome = self.process_job(&jobs[i], &cancel);
            let collided = matches!(outcome, Outcome::Collision);
            jobs[i].status = match outcome {
                Outcome::Done(status) => status,
                Outcome::Collision => JobStatus::Failed(FailureReason::TargetExists),
            };
            observer.on_job_finished(i + 1, total, &jobs[i]);

            if collided {
                let target = jobs[i].target.path().to_path_buf();
                return Err(VecpdfError::Collision {
                    target,
                    summary: Box::new(BatchSummary::from_jobs(jobs)),
                });
            }
        }

        Ok(BatchSummary::from_jobs(jobs))
    }

    fn run_parallel(
        &self,
        mut jobs: Vec<ConversionJob>,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchSummary> {
        let total = jobs.len();
        let cancel = AtomicBool::new(false);
        let completed = Mutex::new(0usize);
        let first_collision: Mutex<Option<usize>> = Mutex::new(None);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| VecpdfError::WorkerPool(e.to_string()))?;

        let groups = group_by_target(&jobs);
        let jobs_ref = &jobs;

        let results: Vec<(usize, JobStatus)> = pool.install(|| {
            groups
                .par_iter()
                .flat_map_iter(|group| {
                    let mut statuses = Vec::with_capacity(group.len());
                    for &idx in group {
                        let status = match self.process_job(&jobs_ref[idx], &cancel) {
                            Outcome::Done(status) => status,
                            Outcome::Collision => {
                                cancel.store(true, Ordering::SeqCst);
                                let mut first = lock(&first_collision);
                                if first.map_or(true, |f| idx < f) {
                                    *first = Some(idx);
                                }
                                JobStatus::Failed(FailureReason::TargetExists)
                            }
                        };

                        {
                            let mut done = lock(&completed);
                            *done += 1;
                            let mut finished = jobs_ref[idx].clone();
                            finished.status = status.clone();
                            observer.on_job_finished(*done, total, &finished);
                        }

                        statuses.push((idx, status));
                    }
                    statuses
                })
                .collect()
        });

        for (idx, status) in results {
            jobs[idx].status = status;
        }

        let collision = lock(&first_collision).take();
        match collision {
            Some(idx) => {
                let target = jobs[idx].target.path().to_path_buf();
                Err(VecpdfError::Collision {
                    target,
                    summary: Box::new(BatchSummary::from_jobs(jobs)),
                })
            }
            None => Ok(BatchSummary::from_jobs(jobs)),
        }
    }

    /// 处理单个作业
    fn process_job(&self, job: &ConversionJob, cancel: &AtomicBool) -> Outcome {
        if cancel.load(Ordering::SeqCst) {
            return Outcome::Done(JobStatus::Failed(FailureReason::Cancelled));
        }

        // 源文件可能在发现之后被删除
        if !job.source.exists() {
            warn!("File not found: {}", job.source);
            return Outcome::Done(JobStatus::Failed(FailureReason::NotFound));
        }

        let target = job.target.path();
        if is_same_file(job.source.path(), target) {
            warn!("Target is the source itself: {}", job.source);
            return Outcome::Done(JobStatus::Failed(FailureReason::SameAsSource));
        }

        if target.exists() {
            match self.collision {
                CollisionPolicy::Overwrite => {
                    if let Err(e) = fs::remove_file(target) {
                        return Outcome::Done(JobStatus::Failed(FailureReason::RemoveFailed(
                            e.to_string(),
                        )));
                    }
                    debug!("Removed existing target {}", target.display());
                }
                CollisionPolicy::Fail => return Outcome::Collision,
                CollisionPolicy::Skip => {
                    return Outcome::Done(JobStatus::Failed(FailureReason::TargetExists))
                }
            }
        }

        let ctx = SaveContext {
            options: &self.options,
            timeout: self.timeout,
            cancel,
        };

        let started = Instant::now();
        let result = converter::convert_one(self.converter, &job.source, target, &ctx);
        debug!(
            "{} -> {} via {} in {:.2?}",
            job.source.name(),
            target.display(),
            self.converter.name(),
            started.elapsed()
        );

        match result {
            Ok(()) => Outcome::Done(JobStatus::Succeeded),
            Err(ConvertError::Cancelled) => {
                Outcome::Done(JobStatus::Failed(FailureReason::Cancelled))
            }
            Err(e) => Outcome::Done(JobStatus::Failed(FailureReason::Convert(e.to_string()))),
        }
    }
}

/// 目标是否就是源文件（大小写不敏感的文件系统上路径可能不同）
fn is_same_file(source: &Path, target: &Path) -> bool {
    if source == target {
        return true;
    }
    match (fs::canonicalize(source), fs::canonicalize(target)) {
        (Ok(s), Ok(t)) => s == t,
        _ => false,
    }
}

/// 按目标路径分组（保持首次出现顺序），组内保持批次顺序
fn group_by_target(jobs: &[ConversionJob]) -> Vec<Vec<usize>> {
    let mut index: HashMap<&Path, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, job) in jobs.iter().enumerate() {
        let slot = *index.entry(job.target.path()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }
    groups
}

/// 目标路径在批次内重复的作业
pub fn duplicate_targets(jobs: &[ConversionJob]) -> Vec<PathBuf> {
    group_by_target(jobs)
        .into_iter()
        .filter(|g| g.len() > 1)
        .map(|g| jobs[g[0]].target.path().to_path_buf())
        .collect()
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
