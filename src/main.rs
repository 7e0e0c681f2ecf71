use placescout::{PlaceScoutConfig, Result, TravelEngine};
use tracing_subscriber::EnvFilter;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlaceScoutConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let name = std::env::args().nth(1).unwrap_or_else(|| "Rome".to_string());
    let engine = TravelEngine::new(config)?;

    println!("Exploring: {name}");

    let Some(geo) = engine.geocode(&name).await else {
        println!("Could not geocode '{name}'.");
        return Ok(());
    };
    println!("Resolved to {} ({:.4}, {:.4})", geo.display_name, geo.lat, geo.lon);

    if let Some(summary) = engine.resolve_summary(&name).await {
        println!("\n{} ({})\n{}", summary.source.label(), summary.url, summary.text);
    } else {
        println!("\nNo summary available.");
    }

    let places = engine.resolve_places(geo.lat, geo.lon, 3000.0).await;
    if places.is_empty() {
        println!("\nNo nearby attractions found.");
    } else {
        println!("\nNearby attractions:");
        for place in places.iter().take(10) {
            println!("  - {} ({:.4}, {:.4})", place.name, place.point.lat, place.point.lon);
        }
    }

    let guide = engine.resolve_guide(&name).await;
    if guide.sections.is_empty() {
        println!("\nGuide not available.");
    } else {
        let labels: Vec<&str> = guide.sections.iter().map(|s| s.label.as_str()).collect();
        println!("\nGuide sections: {}", labels.join(", "));
    }

    if let Some(months) = engine.resolve_climate(&name, geo.lat, geo.lon).await {
        println!("\nForecast-based climate (approximate):");
        for month in months {
            println!(
                "  {}: {:.1}°C, {:.0}% humidity, {:.0}mm rain",
                MONTHS[month.month as usize],
                month.avg_temperature_c,
                month.avg_humidity_pct,
                month.total_rain_mm
            );
        }
    }

    Ok(())
}
