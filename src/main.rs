use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use synopsis::config::SynopsisConfig;
use synopsis::discussion::{Discussion, DiscussionListRenderer};
use synopsis::tags::{Tag, TagStore};
use synopsis::{Truncator, check, excerpt};

#[derive(Parser)]
#[command(name = "synopsis", about = "论坛讨论列表摘要工具", version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 截断单个 HTML 片段，输出 JSON 结果
    Truncate {
        /// HTML 文件路径，`-` 表示标准输入
        input: PathBuf,

        /// 文本长度预算
        #[arg(short, long, allow_negative_numbers = true)]
        length: i64,

        /// 图片数量上限
        #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
        images: i64,
    },

    /// 渲染讨论列表摘要
    Render {
        /// 项目根目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// 讨论列表 JSON 文件
        #[arg(short, long)]
        discussions: PathBuf,

        /// 当前搜索词
        #[arg(short, long)]
        query: Option<String>,
    },

    /// 更新标签的摘要设置
    TagUpdate {
        /// 项目根目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// 标签 id
        #[arg(long)]
        tag: String,

        /// 标签不存在时以该名称新建
        #[arg(long)]
        name: Option<String>,

        /// 变更集 JSON，例如 '{"attributes": {"excerptLength": 30}}'
        #[arg(long)]
        changes: String,
    },

    /// 检查配置与标签设置
    Check {
        /// 项目根目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 对于带项目根目录的命令，使用配置中的日志级别作为默认值
    let default_level = match &cli.command {
        Commands::Render { root, .. } | Commands::TagUpdate { root, .. } | Commands::Check { root } => {
            SynopsisConfig::load(root).ok().map(|c| c.log.level)
        }
        Commands::Truncate { .. } => None,
    };
    let default_level = default_level.as_deref().unwrap_or("info");

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Truncate {
            input,
            length,
            images,
        } => {
            let html = read_input(&input)?;
            let result = excerpt::truncate::truncate_html(&html, length, images)?;
            tracing::info!("截断完成：原始图片 {} 张，上限 {}", result.total_images, images);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Render {
            root,
            discussions,
            query,
        } => {
            let config = SynopsisConfig::load(&root)?;
            let store = TagStore::load(&root)?;
            let content = std::fs::read_to_string(&discussions)
                .with_context(|| format!("读取 {} 失败", discussions.display()))?;
            let list: Vec<Discussion> = serde_json::from_str(&content)
                .with_context(|| format!("解析 {} 失败", discussions.display()))?;

            let truncator = Truncator::new(config.cache.capacity);
            let renderer = DiscussionListRenderer::new(&config.synopsis, store.index(), &truncator)
                .parallel(config.render.parallel);

            let start = std::time::Instant::now();
            let items = renderer.render(&list, query.as_deref());
            let rendered = items.iter().filter(|item| item.excerpt.is_some()).count();
            tracing::info!(
                "渲染完成：{} 个讨论，{} 个摘要，耗时 {:?}",
                items.len(),
                rendered,
                start.elapsed()
            );
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Commands::TagUpdate {
            root,
            tag,
            name,
            changes,
        } => {
            let data: serde_json::Value =
                serde_json::from_str(&changes).context("变更集不是合法的 JSON")?;
            let mut store = TagStore::load(&root)?;
            if store.get(&tag).is_none()
                && let Some(name) = name
            {
                tracing::info!("新建标签 {tag}（{name}）");
                store.insert(Tag::new(tag.clone(), name));
            }

            let updated = store.apply(&tag, &data)?;
            println!("{}", serde_json::to_string_pretty(updated)?);
            store.save()?;
            tracing::info!("标签 {tag} 已保存");
        }
        Commands::Check { root } => {
            let result = check::run(&root)?;

            for w in &result.warnings {
                tracing::warn!("{w}");
            }
            for e in &result.errors {
                tracing::error!("{e}");
            }

            if result.errors.is_empty() {
                tracing::info!("检查通过（{} 个警告）", result.warnings.len());
            } else {
                anyhow::bail!(
                    "检查未通过：{} 个错误，{} 个警告",
                    result.errors.len(),
                    result.warnings.len()
                );
            }
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("读取 {} 失败", path.display()))
}

const fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit:  ",
        env!("SYNOPSIS_GIT_COMMIT"),
        "\nbuild:   ",
        env!("SYNOPSIS_BUILD_TIME"),
        "\ntarget:  ",
        env!("SYNOPSIS_BUILD_TARGET"),
        "\nprofile: ",
        env!("SYNOPSIS_BUILD_PROFILE"),
    )
}
