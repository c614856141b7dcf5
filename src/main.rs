use anyhow::Result;
use quiz_publisher::config::Config;
use quiz_publisher::logger;
use quiz_publisher::App;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::load()?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
