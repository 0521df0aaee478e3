use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

/// 初始化运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n问答批处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 向运行日志追加一条问答记录
pub fn append_log_entry(log_file_path: &str, index: usize, question: &str, outcome: &str) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;
    writeln!(file, "[问题 {}] {}\n{}\n", index, question, outcome)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `documents`: 语料文档数量
/// - `cache_entries`: 问答缓存条数
/// - `max_concurrent`: 最大并发数
pub fn log_startup(documents: usize, cache_entries: usize, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 课程问答服务");
    info!("📚 语料文档: {} 篇", documents);
    info!("🗂️ 问答缓存: {} 条", cache_entries);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录批量问答开始
///
/// # 参数
/// - `total`: 问题总数
/// - `max_concurrent`: 最大并发数
pub fn log_batch_start(total: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量处理 {} 个问题", total);
    info!("💡 最多同时处理 {} 个", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录批量问答完成
pub fn log_batch_complete(success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批量处理完成: 成功 {}/{}", success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("ما هي مواد الفرقة", 5), "ما هي...");
    }

    #[test]
    fn test_log_file_header_and_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.log");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_log_entry(path, 1, "What are the level 1 courses?", "- CS101: Intro").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("问答批处理日志"));
        assert!(content.contains("[问题 1] What are the level 1 courses?"));
    }
}
