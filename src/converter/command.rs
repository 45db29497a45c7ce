//! # 外部命令转换器
//!
//! 每个文档调用一次外部程序完成 EPS/AI -> PDF 转换，默认使用 Ghostscript pdfwrite。
//!
//! ## 功能
//! - 参数模板（`{input}`, `{output}` 占位符）
//! - 转换选项映射为 Ghostscript 参数；自定义命令通过 `VECPDF_OPTION_*` 环境变量接收
//! - 超时与取消：轮询子进程，到期或取消时终止
//! - 失败时清理不完整的输出文件
//!
//! ## 依赖关系
//! - 实现 `converter/mod.rs` 中的 `Converter` trait
//! - 被 `commands/convert.rs` 创建

use super::{Converter, Document, SaveContext};
use crate::error::{ConvertError, ConvertResult};
use crate::models::options::{COLOR_DOWNSAMPLING_DPI, COMPATIBILITY_LEVEL, PRESET};
use crate::models::{ConversionOptions, SourceFile};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// 子进程轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 错误信息中保留的 stderr 行数
const STDERR_TAIL_LINES: usize = 8;

/// 默认 Ghostscript 可执行文件名
pub fn default_program() -> &'static str {
    if cfg!(windows) {
        "gswin64c"
    } else {
        "gs"
    }
}

/// 外部命令转换器
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    /// None 时使用 Ghostscript 默认参数
    arg_template: Option<Vec<String>>,
}

impl CommandConverter {
    /// 使用 Ghostscript 默认参数
    pub fn ghostscript(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arg_template: None,
        }
    }

    /// 使用自定义参数模板
    pub fn custom(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            arg_template: Some(args),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// 构造命令行参数
    pub fn build_args(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> Vec<OsString> {
        match &self.arg_template {
            Some(template) => template
                .iter()
                .map(|arg| substitute(arg, input, output))
                .collect(),
            None => ghostscript_args(input, output, options),
        }
    }

    /// 自定义命令通过环境变量接收转换选项
    fn option_env(&self, options: &ConversionOptions) -> Vec<(String, String)> {
        if self.arg_template.is_none() {
            return Vec::new();
        }
        options
            .iter()
            .map(|(k, v)| (format!("VECPDF_OPTION_{}", env_key(k)), v.to_string()))
            .collect()
    }

    /// 运行一次转换命令
    fn run(&self, input: &Path, output: &Path, ctx: &SaveContext<'_>) -> ConvertResult<()> {
        let args = self.build_args(input, output, ctx.options);
        debug!("Running {} {:?}", self.program, args);

        let child = Command::new(&self.program)
            .args(&args)
            .envs(self.option_env(ctx.options))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ConvertError::CommandNotFound {
                    command: self.program.clone(),
                },
                _ => ConvertError::Io(e),
            })?;

        let mut process = RunningProcess::new(child);
        let status = process.wait(ctx)?;
        let stderr = process.take_stderr();

        if !status.success() {
            return Err(ConvertError::CommandFailed {
                command: self.program.clone(),
                status: status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        if !output.exists() {
            return Err(ConvertError::MissingOutput {
                path: output.display().to_string(),
            });
        }

        Ok(())
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn open<'a>(&'a self, source: &SourceFile) -> ConvertResult<Box<dyn Document + 'a>> {
        let handle = File::open(source.path()).map_err(|e| ConvertError::Open {
            path: source.path().display().to_string(),
            source: e,
        })?;

        Ok(Box::new(CommandDocument {
            converter: self,
            source: source.path().to_path_buf(),
            handle: Some(handle),
        }))
    }
}

/// 外部命令转换器打开的文档（持有源文件句柄直到关闭）
struct CommandDocument<'a> {
    converter: &'a CommandConverter,
    source: PathBuf,
    handle: Option<File>,
}

impl Document for CommandDocument<'_> {
    fn save_as(&mut self, target: &Path, ctx: &SaveContext<'_>) -> ConvertResult<()> {
        let result = self.converter.run(&self.source, target, ctx);
        if result.is_err() && target.exists() {
            // 清理不完整的输出
            let _ = fs::remove_file(target);
        }
        result
    }

    fn close(&mut self) -> ConvertResult<()> {
        self.handle.take();
        Ok(())
    }
}

/// 运行中的子进程；未正常结束时在 drop 中终止
struct RunningProcess {
    child: Child,
    stderr: Option<thread::JoinHandle<String>>,
    finished: bool,
}

impl RunningProcess {
    fn new(mut child: Child) -> Self {
        // 后台读取 stderr，避免管道写满阻塞子进程
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                pipe.read_to_string(&mut buf).ok();
                buf
            })
        });
        Self {
            child,
            stderr,
            finished: false,
        }
    }

    /// 等待子进程结束，遵守超时与取消
    fn wait(&mut self, ctx: &SaveContext<'_>) -> ConvertResult<ExitStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.finished = true;
                return Ok(status);
            }
            if ctx.is_cancelled() {
                self.terminate();
                return Err(ConvertError::Cancelled);
            }
            if let Some(timeout) = ctx.timeout {
                if started.elapsed() >= timeout {
                    self.terminate();
                    return Err(ConvertError::Timeout(timeout));
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn terminate(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.finished = true;
    }

    fn take_stderr(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for RunningProcess {
    fn drop(&mut self) {
        if !self.finished {
            self.terminate();
        }
    }
}

/// Ghostscript pdfwrite 参数
fn ghostscript_args(input: &Path, output: &Path, options: &ConversionOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-dBATCH",
        "-dNOPAUSE",
        "-dSAFER",
        "-q",
        "-dEPSCrop",
        "-sDEVICE=pdfwrite",
    ]
    .iter()
    .map(OsString::from)
    .collect();

    for (key, value) in options.iter() {
        match key {
            COMPATIBILITY_LEVEL => args.push(format!("-dCompatibilityLevel={}", value).into()),
            COLOR_DOWNSAMPLING_DPI => {
                args.push("-dDownsampleColorImages=true".into());
                args.push(format!("-dColorImageResolution={}", value).into());
            }
            PRESET => args.push(format!("-dPDFSETTINGS=/{}", value.trim_start_matches('/')).into()),
            _ => args.push(format!("-d{}={}", key, value).into()),
        }
    }

    let mut out = OsString::from("-sOutputFile=");
    out.push(output.as_os_str());
    args.push(out);
    args.push(input.as_os_str().to_os_string());
    args
}

/// 替换参数模板中的占位符
fn substitute(arg: &str, input: &Path, output: &Path) -> OsString {
    if arg == "{input}" {
        return input.as_os_str().to_os_string();
    }
    if arg == "{output}" {
        return output.as_os_str().to_os_string();
    }
    arg.replace("{input}", &input.to_string_lossy())
        .replace("{output}", &output.to_string_lossy())
        .into()
}

/// 选项键转为环境变量名
fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// 取最后 n 行
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_ghostscript_default_args() {
        let conv = CommandConverter::ghostscript("gs");
        let args = strings(conv.build_args(
            Path::new("/in/logo.eps"),
            Path::new("/out/logo.pdf"),
            &ConversionOptions::new(),
        ));
        assert!(args.contains(&"-sDEVICE=pdfwrite".to_string()));
        assert_eq!(args[args.len() - 2], "-sOutputFile=/out/logo.pdf");
        assert_eq!(args[args.len() - 1], "/in/logo.eps");
    }

    #[test]
    fn test_ghostscript_option_mapping() {
        let opts = ConversionOptions::new()
            .with_compatibility_level("1.6")
            .with_color_downsampling_dpi(300)
            .with_preset("/prepress")
            .with("AutoRotatePages", "/None");
        let args = strings(CommandConverter::ghostscript("gs").build_args(
            Path::new("a.ai"),
            Path::new("a.pdf"),
            &opts,
        ));
        assert!(args.contains(&"-dCompatibilityLevel=1.6".to_string()));
        assert!(args.contains(&"-dDownsampleColorImages=true".to_string()));
        assert!(args.contains(&"-dColorImageResolution=300".to_string()));
        assert!(args.contains(&"-dPDFSETTINGS=/prepress".to_string()));
        assert!(args.contains(&"-dAutoRotatePages=/None".to_string()));
    }

    #[test]
    fn test_custom_template() {
        let conv = CommandConverter::custom(
            "inkscape",
            vec!["{input}".into(), "--export-filename={output}".into()],
        );
        let opts = ConversionOptions::new().with_preset("print");
        let args = strings(conv.build_args(Path::new("a.eps"), Path::new("a.pdf"), &opts));
        assert_eq!(args, vec!["a.eps", "--export-filename=a.pdf"]);
        assert_eq!(
            conv.option_env(&opts),
            vec![("VECPDF_OPTION_PRESET".to_string(), "print".to_string())]
        );
    }

    #[test]
    fn test_env_key_and_tail() {
        assert_eq!(env_key("colorDownsamplingDPI"), "COLORDOWNSAMPLINGDPI");
        assert_eq!(env_key("a-b.c"), "A_B_C");
        assert_eq!(tail("1\n2\n\n3\n4", 2), "3\n4");
    }

    #[test]
    fn test_missing_program() {
        let conv = CommandConverter::custom("vecpdf-no-such-program", vec!["{input}".into()]);
        let opts = ConversionOptions::new();
        let cancel = AtomicBool::new(false);
        let ctx = SaveContext {
            options: &opts,
            timeout: None,
            cancel: &cancel,
        };
        let result = conv.run(Path::new("a.eps"), Path::new("a.pdf"), &ctx);
        assert!(matches!(result, Err(ConvertError::CommandNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let conv = CommandConverter::custom("sleep", vec!["5".into()]);
        let opts = ConversionOptions::new();
        let cancel = AtomicBool::new(false);
        let ctx = SaveContext {
            options: &opts,
            timeout: Some(Duration::from_millis(200)),
            cancel: &cancel,
        };
        let started = Instant::now();
        let result = conv.run(Path::new("a.eps"), Path::new("a.pdf"), &ctx);
        assert!(matches!(result, Err(ConvertError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_kills_process() {
        let conv = CommandConverter::custom("sleep", vec!["5".into()]);
        let opts = ConversionOptions::new();
        let cancel = AtomicBool::new(false);
        let ctx = SaveContext {
            options: &opts,
            timeout: None,
            cancel: &cancel,
        };
        let started = Instant::now();
        let result = thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(Duration::from_millis(100));
                cancel.store(true, Ordering::SeqCst);
            });
            conv.run(Path::new("a.eps"), Path::new("a.pdf"), &ctx)
        });
        assert!(matches!(result, Err(ConvertError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_command_failed() {
        let conv = CommandConverter::custom("sh", vec!["-c".into(), "echo bad >&2; exit 3".into()]);
        let opts = ConversionOptions::new();
        let cancel = AtomicBool::new(false);
        let ctx = SaveContext {
            options: &opts,
            timeout: None,
            cancel: &cancel,
        };
        match conv.run(Path::new("a.eps"), Path::new("a.pdf"), &ctx) {
            Err(ConvertError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "bad"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_custom_command_writes_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("a.eps");
        let output = tmp.path().join("a.pdf");
        fs::write(&input, b"%!PS").unwrap();

        let conv = CommandConverter::custom("cp", vec!["{input}".into(), "{output}".into()]);
        let opts = ConversionOptions::new();
        let cancel = AtomicBool::new(false);
        let ctx = SaveContext {
            options: &opts,
            timeout: Some(Duration::from_secs(10)),
            cancel: &cancel,
        };
        let source = SourceFile::new(input).unwrap();
        super::super::convert_one(&conv, &source, &output, &ctx).unwrap();
        assert!(output.exists());
    }
}
