use chrono::Local;
use dotenv::dotenv;
use futures::{Stream, StreamExt};
use hmall_schedule::{
    ChromiumBrowser, CrawlEvent, EventSink, ReconcileMode, ReconcileReport, ScheduleItem,
    ScrapingConfig, ScrapingContext, crawl, update_catalog,
};

extern crate env_logger;
extern crate log;

use log::LevelFilter;

use log::error;

async fn print_progress(events: impl Stream<Item = CrawlEvent>) {
    events
        .for_each(|event| async move {
            match event {
                CrawlEvent::TabsDiscovered { labels, .. } => {
                    println!("📅 발견된 날짜 탭: {}개", labels.len());
                }
                CrawlEvent::TabStarted { label, .. } => {
                    println!("\n  📆 {} 수집 중...", label.replace('\n', " ").trim());
                }
                CrawlEvent::TabSkipped { reason, .. } => {
                    println!("  ⚠️ 탭 전환 실패: {reason}");
                }
                CrawlEvent::TabFinished { items, .. } => {
                    println!("  ✔ {items}개 수집 완료");
                }
                CrawlEvent::PassCompleted { .. } | CrawlEvent::RunFinished { .. } => {}
            }
        })
        .await;
}

async fn run_crawl_job(config: &ScrapingConfig, context: &ScrapingContext) -> Vec<ScheduleItem> {
    let mut browser = match ChromiumBrowser::launch(config.headless).await {
        Ok(browser) => browser,
        Err(e) => {
            error!("Could not start browser: {e}");
            return vec![];
        }
    };
    println!(
        "[{}] 접속 중: {}",
        Local::now().format("%H:%M:%S"),
        config.schedule_url
    );

    let today = Local::now().date_naive();
    let (sink, events) = EventSink::channel();
    let (schedule, ()) = tokio::join!(
        crawl(&mut browser, &config.schedule_url, context, today, sink),
        print_progress(events),
    );
    browser.close().await;
    schedule
}

fn print_report(config: &ScrapingConfig, report: &ReconcileReport) {
    let path = config.catalog_path.display();
    match report.mode {
        ReconcileMode::Filtered => {
            println!("✅ {path} 업데이트 완료! (필터링 적용)");
            println!(
                "📊 수집된 총 방송: {}개 -> 우리 상품 방송: {}개",
                report.collected,
                report.written.len()
            );
            if report.written.is_empty() {
                println!("   - ℹ️ 우리 재고와 일치하는 방송이 없습니다.");
            }
            for item in &report.written {
                println!(
                    "   - [매칭] {} {} | {} | {}",
                    item.date, item.time, item.code, item.name
                );
            }
            println!("📅 대상 날짜: {}", report.dates.join(", "));
        }
        ReconcileMode::ReplaceAll => {
            println!("✅ {path} 업데이트 완료! (전체 반영)");
            println!("📊 수집된 총 방송: {}개", report.collected);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    println!("{}", "=".repeat(50));
    println!("  현대홈쇼핑 방송정보 자동 크롤러");
    println!("{}", "=".repeat(50));

    let config = ScrapingConfig::new()?;
    let context = ScrapingContext::new(config.crawl.clone())?;

    let schedule = run_crawl_job(&config, &context).await;
    if schedule.is_empty() {
        println!("⚠️ 수집된 방송 정보가 없습니다.");
        return Ok(());
    }

    match update_catalog(&config.catalog_path, &schedule, config.reconcile_mode) {
        Ok(report) => print_report(&config, &report),
        Err(e) => {
            error!("Catalog update skipped: {e}");
            println!("❌ {e}");
        }
    }
    Ok(())
}
