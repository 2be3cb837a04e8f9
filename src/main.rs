//! Aloud Precache - 有声朗读音频预缓存服务
//!
//! 启动顺序: 配置 → 日志 → 数据库 → 存储 → 合成后端 → 控制器 → HTTP

use std::sync::Arc;
use std::time::Duration;

use aloud_precache::application::{
    ChapterExpander, DedupRegistry, DownloadController, DownloadControllerConfig, SpeechSettings,
    SpeechSynthesizerPort, SynthesisClient,
};
use aloud_precache::config::{load_config, print_config, AppConfig};
use aloud_precache::infrastructure::adapters::{
    CloudTtsClient, CloudTtsClientConfig, FileChapterContent, FileSpeechCache, HttpTtsClient,
    HttpTtsClientConfig, LineContentProcessor, RetryPolicy, RetryingSynthesizer, SsmlTemplate,
};
use aloud_precache::infrastructure::events::StatusBoard;
use aloud_precache::infrastructure::http::{AppState, HttpServer};
use aloud_precache::infrastructure::memory::RuntimeSettings;
use aloud_precache::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteBookRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},aloud_precache={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Aloud Precache - 有声朗读音频预缓存");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        max_connections: config.database.max_connections,
        ..DatabaseConfig::new(&config.database.path)
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;
    let books = Arc::new(SqliteBookRepository::new(pool));

    // 存储
    let cache = Arc::new(FileSpeechCache::new(&config.storage.cache_dir).await?);
    let removed = cache.remove_stale_temp_files().await?;
    if removed > 0 {
        tracing::info!(removed, "Removed stale temp files from speech cache");
    }
    let contents = Arc::new(FileChapterContent::new(&config.storage.books_dir).await?);
    let processor = Arc::new(LineContentProcessor::default());

    // 运行时设置与状态出口
    let settings = Arc::new(RuntimeSettings::new(SpeechSettings {
        engine: config.speech.engine,
        speech_rate: config.speech.speech_rate,
        thread_count: config.download.thread_count,
    }));
    let status = StatusBoard::new().arc();

    // 合成后端
    let (cloud, http) = build_synthesizers(&config)?;
    let synthesis = Arc::new(SynthesisClient::new(cloud, http, settings.clone()));

    let expander = Arc::new(ChapterExpander::new(books, contents, processor));
    let controller = DownloadController::new(
        DownloadControllerConfig {
            grace_period: config.download.grace_period(),
            progress_interval: config.download.progress_interval(),
            strategy: config.download.expansion,
        },
        expander,
        Arc::new(DedupRegistry::new()),
        synthesis,
        cache,
        settings.clone(),
        status.clone(),
    );

    // 创建 HTTP 服务器
    let state = AppState::new(controller.clone(), settings, status);
    let server = HttpServer::new(config.server.addr(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    let stopped = controller.stop().await;
    tracing::info!(stopped, "Server shutdown complete");

    Ok(())
}

/// 按配置创建云端与 HTTP 后端，未配置的后端为 None
fn build_synthesizers(
    config: &AppConfig,
) -> anyhow::Result<(
    Option<Arc<dyn SpeechSynthesizerPort>>,
    Option<Arc<dyn SpeechSynthesizerPort>>,
)> {
    let cloud_config = &config.speech.cloud;
    let cloud: Option<Arc<dyn SpeechSynthesizerPort>> = if cloud_config.is_enabled() {
        let template = match &cloud_config.template_path {
            Some(path) => SsmlTemplate::load(path),
            None => Ok(SsmlTemplate::default()),
        };
        let client = CloudTtsClient::new(
            CloudTtsClientConfig {
                endpoint: cloud_config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| CloudTtsClientConfig::endpoint_for_region(&cloud_config.region)),
                subscription_key: cloud_config.subscription_key.clone(),
                output_format: cloud_config.output_format.clone(),
                max_concurrent: cloud_config.max_concurrent,
                timeout_secs: cloud_config.timeout_secs,
                proxy: cloud_config.proxy.clone(),
            },
            template,
        )?;
        let policy = RetryPolicy {
            max_retries: cloud_config.max_retries,
            base_delay: Duration::from_millis(cloud_config.retry_base_delay_ms),
            max_delay: Duration::from_millis(cloud_config.retry_max_delay_ms),
        };
        Some(Arc::new(RetryingSynthesizer::new(Arc::new(client), policy)))
    } else {
        None
    };

    let http_config = &config.speech.http;
    let http: Option<Arc<dyn SpeechSynthesizerPort>> = if http_config.url.is_empty() {
        None
    } else {
        let client = HttpTtsClient::new(
            HttpTtsClientConfig::new(&http_config.url).with_timeout(http_config.timeout_secs),
        )?;
        Some(Arc::new(client))
    };

    if cloud.is_none() && http.is_none() {
        tracing::warn!("No speech backend configured, every paragraph will fail");
    }

    Ok((cloud, http))
}
