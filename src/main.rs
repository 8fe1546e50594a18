//! Port Vitals 主程序入口
//!
//! TCP端口存活探测与Prometheus导出

use anyhow::{Context, Result};
use clap::Parser;
use port_vitals::cli::{Args, CheckCommand, Command, Commands, RunCommand};
use port_vitals::logging::{LogConfig, LoggingSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        json_format: args.json_logs,
        ..Default::default()
    };

    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!("Port Vitals v{} 启动", port_vitals::VERSION);

    // 执行命令
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    let command: Box<dyn Command> = match args.effective_command() {
        Commands::Run => Box::new(RunCommand),
        Commands::Check { .. } => Box::new(CheckCommand),
    };

    command.execute(args).await.map_err(anyhow::Error::from)
}
