//! Replace every listing with randomly generated sample campgrounds.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use campgrounds::domain::ports::{RegistrationService, UserRepository};
use campgrounds::domain::{
    AccountService, ErrorCode, GeoPoint, Image, Listing, ListingDraft, Price, Registration,
    UserId, Username,
};
use campgrounds::outbound::password_hashing::Argon2PasswordHasher;
use campgrounds::outbound::persistence::{
    DbPool, DieselListingRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use clap::Parser;
use rand::Rng;
use rand::seq::SliceRandom;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const DATABASE_URL_ENV: &str = "CAMPGROUNDS_DATABASE_URL";

const DESCRIPTION: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
Maecenas tempor ipsum diam, vel gravida urna tincidunt a. Nullam faucibus ligula vitae \
tortor semper scelerisque.";

const DESCRIPTORS: &[&str] = &[
    "Forest", "Ancient", "Petrified", "Roaring", "Cascade", "Tumbling", "Silent", "Redwood",
    "Bullfrog", "Maple", "Misty", "Elk", "Grizzly", "Ocean", "Sea", "Sky", "Dusty", "Diamond",
];

const PLACES: &[&str] = &[
    "Flats", "Village", "Canyon", "Pond", "Group Camp", "Horse Camp", "Ghost Town", "Camp",
    "Dispersed Camp", "Backcountry", "River", "Creek", "Creekside", "Bay", "Spring", "Bayshore",
    "Sands", "Mule Camp", "Hunting Camp", "Cliffs", "Hollow",
];

/// City, state, longitude, latitude.
const CITIES: &[(&str, &str, f64, f64)] = &[
    ("New York", "New York", -74.0059, 40.7128),
    ("Los Angeles", "California", -118.2437, 34.0522),
    ("Chicago", "Illinois", -87.6298, 41.8781),
    ("Houston", "Texas", -95.3698, 29.7604),
    ("Phoenix", "Arizona", -112.0740, 33.4484),
    ("Philadelphia", "Pennsylvania", -75.1652, 39.9526),
    ("San Antonio", "Texas", -98.4936, 29.4241),
    ("San Diego", "California", -117.1611, 32.7157),
    ("Dallas", "Texas", -96.7970, 32.7767),
    ("San Jose", "California", -121.8863, 37.3382),
    ("Austin", "Texas", -97.7431, 30.2672),
    ("Jacksonville", "Florida", -81.6557, 30.3322),
    ("Columbus", "Ohio", -82.9988, 39.9612),
    ("Denver", "Colorado", -104.9903, 39.7392),
    ("Seattle", "Washington", -122.3321, 47.6062),
    ("Nashville", "Tennessee", -86.7816, 36.1627),
    ("Portland", "Oregon", -122.6765, 45.5231),
    ("Las Vegas", "Nevada", -115.1398, 36.1699),
    ("Albuquerque", "New Mexico", -106.6504, 35.0844),
    ("Tucson", "Arizona", -110.9747, 32.2226),
    ("Sacramento", "California", -121.4944, 38.5816),
    ("Salt Lake City", "Utah", -111.8910, 40.7608),
    ("Boise", "Idaho", -116.2023, 43.6150),
    ("Anchorage", "Alaska", -149.9003, 61.2181),
    ("Asheville", "North Carolina", -82.5515, 35.5951),
    ("Bozeman", "Montana", -111.0429, 45.6770),
    ("Flagstaff", "Arizona", -111.6513, 35.1983),
    ("Bend", "Oregon", -121.3153, 44.0582),
    ("Duluth", "Minnesota", -92.1005, 46.7867),
    ("Burlington", "Vermont", -73.2121, 44.4759),
];

const SAMPLE_IMAGES: &[(&str, &str)] = &[
    (
        "https://res.cloudinary.com/duuklscys/image/upload/v1691851569/YelpCamp/patrick-hendry-eDgUyGu93Yw-unsplash_pobv4o.png",
        "YelpCamp/keyovexeaymdgfukvthd",
    ),
    (
        "https://res.cloudinary.com/duuklscys/image/upload/v1691851571/YelpCamp/jesse-gardner-wTVr4HR4SBI-unsplash_bhfbqk.png",
        "YelpCamp/czpbk19fkw7968hgehic",
    ),
    (
        "https://res.cloudinary.com/duuklscys/image/upload/v1691851572/YelpCamp/scott-goodwill-y8Ngwq34_Ak-unsplash_rqusup.png",
        "YelpCamp/bqdk8o9xs3ytdfixilbj",
    ),
];

/// `seed-campgrounds` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-campgrounds",
    about = "Wipe all listings and insert randomly generated sample campgrounds",
    version
)]
struct CliArgs {
    /// Number of listings to generate.
    #[arg(long, default_value_t = 50)]
    count: usize,
    /// Username of the account that authors every sample listing.
    #[arg(long, default_value = "seed")]
    username: String,
    /// Email used when the seed account does not exist yet.
    #[arg(long, default_value = "seed@example.com")]
    email: String,
    /// Password used when the seed account does not exist yet.
    #[arg(long, default_value = "seed-password")]
    password: String,
    /// Database connection URL. Falls back to `CAMPGROUNDS_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(%error, "tracing init failed");
    }
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url.clone())?;
    run_pending_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(format!("run migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let author = seed_author(&pool, &args).await?;
    let listings = sample_listings(&mut rand::thread_rng(), args.count, author)?;
    let written = DieselListingRepository::new(pool)
        .replace_all(&listings)
        .await
        .map_err(|error| io::Error::other(format!("write listings: {error}")))?;

    info!(written, author = %author, "seeded listings");
    Ok(())
}

fn resolve_database_url(cli_value: Option<String>) -> io::Result<String> {
    cli_value
        .or_else(|| env::var(DATABASE_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("database URL is required via --database-url or {DATABASE_URL_ENV}"),
            )
        })
}

/// Register the seed account, or reuse it when it already exists.
async fn seed_author(pool: &DbPool, args: &CliArgs) -> io::Result<UserId> {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let accounts = AccountService::new(users.clone(), Arc::new(Argon2PasswordHasher::default()));
    let registration = Registration::try_from_parts(&args.email, &args.username, &args.password)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    match accounts.register(&registration).await {
        Ok(identity) => {
            info!(username = %identity.username(), "created seed account");
            Ok(*identity.user_id())
        }
        Err(error) if error.code() == ErrorCode::Conflict => {
            let username = Username::new(&args.username)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
            let stored = users
                .find_credentials(&username)
                .await
                .map_err(|err| io::Error::other(format!("look up seed account: {err}")))?
                .ok_or_else(|| {
                    io::Error::other(format!(
                        "seed account {username} conflicts with an existing email"
                    ))
                })?;
            Ok(*stored.user.id())
        }
        Err(error) => Err(io::Error::other(format!("register seed account: {error}"))),
    }
}

/// Build `count` listings with random titles, cities and prices.
fn sample_listings<R: Rng>(rng: &mut R, count: usize, author: UserId) -> io::Result<Vec<Listing>> {
    (0..count).map(|_| sample_listing(rng, author)).collect()
}

fn sample_listing<R: Rng>(rng: &mut R, author: UserId) -> io::Result<Listing> {
    let invalid = |error: campgrounds::domain::ListingValidationError| {
        io::Error::other(format!("generated listing is invalid: {error}"))
    };
    let descriptor = DESCRIPTORS.choose(rng).copied().unwrap_or("Quiet");
    let place = PLACES.choose(rng).copied().unwrap_or("Camp");
    let (city, state, longitude, latitude) = CITIES
        .choose(rng)
        .copied()
        .ok_or_else(|| io::Error::other("no sample cities"))?;
    let price = Price::new(f64::from(rng.gen_range(10_u32..30))).map_err(invalid)?;
    let draft = ListingDraft::new(
        &format!("{descriptor} {place}"),
        &format!("{city}, {state}"),
        price,
        DESCRIPTION,
    )
    .map_err(invalid)?;
    let geometry = GeoPoint::new(longitude, latitude).map_err(invalid)?;
    let images = SAMPLE_IMAGES
        .iter()
        .map(|(url, filename)| Image {
            url: (*url).to_owned(),
            filename: (*filename).to_owned(),
        })
        .collect();
    Ok(Listing::create(author, draft, geometry, images))
}
