#![allow(clippy::let_and_return)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
extern crate log;

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;

fn configure_logs() {
    use simplelog::*;

    let mut cfg = ConfigBuilder::new();

    let min_loglevel = match std::env::var("MEDIADUP_LOG").as_deref() {
        Ok("trace") => LevelFilter::Trace,
        Ok("debug") => LevelFilter::Debug,
        Ok("warn") => LevelFilter::Warn,
        Ok("error") => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    TermLogger::init(min_loglevel, cfg.build(), TerminalMode::Stderr, ColorChoice::Auto)
        .expect("TermLogger failed to initialize");
}

// Recursive directory walks plus concurrent ffmpeg/ffprobe subprocess fan-out
// can exhaust the default 1024 open-file-descriptor limit quickly.
#[cfg(target_family = "unix")]
fn raise_fd_limit() {
    const NOFILE: rlimit::Resource = rlimit::Resource::NOFILE;
    const MIN_NOFILE: u64 = 16384;

    let Ok((curr_soft, curr_hard)) = rlimit::getrlimit(NOFILE) else {
        return;
    };

    if curr_soft >= MIN_NOFILE && curr_hard >= MIN_NOFILE {
        return;
    }

    let new_soft = curr_soft.max(MIN_NOFILE);
    let new_hard = curr_hard.max(MIN_NOFILE);

    let Ok(()) = rlimit::setrlimit(NOFILE, new_soft, new_hard) else {
        return;
    };
}

fn main() {
    configure_logs();

    #[cfg(target_family = "unix")]
    raise_fd_limit();

    let return_code = app::run_app();
    std::process::exit(return_code)
}
