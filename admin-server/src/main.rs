use admin_server::{Config, Server, ServerError, init_logger, print_banner};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. 加载 .env (可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env()?;

    // 3. 日志
    init_logger(&config.log_level, config.log_json, Some(&config.log_dir()))?;

    print_banner();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Admin server starting..."
    );

    // 4. 初始化状态并启动 HTTP 服务器
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
