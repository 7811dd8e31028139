//! Demo data for a fresh directory.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use super::Storage;
use crate::domain::business::WEEKDAYS;
use crate::domain::{Address, BusinessHours, NewBusiness, NewReview, NewUser, Role};
use crate::error::Result;

/// Password of every demo account.
pub const DEMO_PASSWORD: &str = "password123";

/// Demo business owner login.
pub const DEMO_OWNER_EMAIL: &str = "owner@pimp.example";

/// Demo customer login.
pub const DEMO_CUSTOMER_EMAIL: &str = "alex@pimp.example";

/// Demo administrator login.
pub const DEMO_ADMIN_EMAIL: &str = "admin@pimp.example";

/// What a seeding run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Listings created.
    pub businesses: usize,
    /// Reviews created.
    pub reviews: usize,
    /// Accounts created.
    pub users: usize,
}

struct SeedBusiness {
    name: &'static str,
    tagline: &'static str,
    description: &'static str,
    categories: &'static [&'static str],
    street: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
    phone: &'static str,
    website: Option<&'static str>,
    founded: i32,
    accredited_since: Option<(i32, u32, u32)>,
    weekend: &'static str,
}

const BUSINESSES: &[SeedBusiness] = &[
    SeedBusiness {
        name: "Summit Plumbing & Heating",
        tagline: "Licensed plumbers, same-day service.",
        description: "Family-run plumbing and heating contractor serving the metro area for over twenty years. Repairs, water heaters, drain cleaning and boiler service.",
        categories: &["home-services"],
        street: "418 Oak Street",
        city: "Springfield",
        state: "IL",
        zip: "62701",
        phone: "(217) 555-0142",
        website: Some("https://summitplumbing.example"),
        founded: 2001,
        accredited_since: Some((2016, 4, 12)),
        weekend: "8:00 AM - 12:00 PM",
    },
    SeedBusiness {
        name: "Bella Cucina Trattoria",
        tagline: "Handmade pasta and wood-fired pizza.",
        description: "Neighborhood Italian restaurant with fresh pasta made every morning, a wood-fired oven and a wine list of small Italian producers.",
        categories: &["restaurants"],
        street: "27 Market Square",
        city: "Springfield",
        state: "IL",
        zip: "62704",
        phone: "(217) 555-0187",
        website: Some("https://bellacucina.example"),
        founded: 2012,
        accredited_since: Some((2019, 3, 1)),
        weekend: "4:00 PM - 11:00 PM",
    },
    SeedBusiness {
        name: "Precision Auto Care",
        tagline: "Honest repairs, upfront quotes.",
        description: "Full-service auto repair shop. Brakes, engine diagnostics, tires, alignments and state inspections with written estimates before any work.",
        categories: &["automotive"],
        street: "1550 Industrial Parkway",
        city: "Decatur",
        state: "IL",
        zip: "62521",
        phone: "(217) 555-0123",
        website: None,
        founded: 2008,
        accredited_since: Some((2015, 9, 20)),
        weekend: "9:00 AM - 2:00 PM",
    },
    SeedBusiness {
        name: "Bright Smile Dental",
        tagline: "Gentle family dentistry.",
        description: "General and cosmetic dentistry for the whole family, including cleanings, crowns, whitening and emergency appointments.",
        categories: &["health-medical"],
        street: "900 Wellness Drive, Suite 2",
        city: "Champaign",
        state: "IL",
        zip: "61820",
        phone: "(217) 555-0166",
        website: Some("https://brightsmile.example"),
        founded: 2005,
        accredited_since: Some((2020, 1, 15)),
        weekend: "Closed",
    },
    SeedBusiness {
        name: "Serenity Day Spa",
        tagline: "Massage, facials and quiet.",
        description: "Day spa offering massage therapy, facials, manicures and couples packages in a calm setting.",
        categories: &["beauty-spas"],
        street: "63 Lakeview Road",
        city: "Champaign",
        state: "IL",
        zip: "61821",
        phone: "(217) 555-0178",
        website: Some("https://serenityspa.example"),
        founded: 2016,
        accredited_since: None,
        weekend: "10:00 AM - 6:00 PM",
    },
    SeedBusiness {
        name: "Hartley & Cole Accounting",
        tagline: "Tax preparation and bookkeeping.",
        description: "Certified public accountants handling personal and small-business taxes, payroll, bookkeeping and year-round planning.",
        categories: &["professional-services"],
        street: "210 Capitol Avenue",
        city: "Springfield",
        state: "IL",
        zip: "62701",
        phone: "(217) 555-0111",
        website: Some("https://hartleycole.example"),
        founded: 1994,
        accredited_since: Some((2003, 6, 30)),
        weekend: "Closed",
    },
    SeedBusiness {
        name: "Greenleaf Garden Center",
        tagline: "Plants, soil and advice.",
        description: "Garden center with annuals, perennials, trees and shrubs, plus landscaping consultations and a weekend workshop series.",
        categories: &["retail", "home-services"],
        street: "7800 Route 4",
        city: "Chatham",
        state: "IL",
        zip: "62629",
        phone: "(217) 555-0190",
        website: None,
        founded: 1988,
        accredited_since: None,
        weekend: "9:00 AM - 5:00 PM",
    },
    SeedBusiness {
        name: "ByteWise Computer Repair",
        tagline: "Laptops, phones and networks fixed fast.",
        description: "Computer and phone repair, data recovery, virus removal and small-office network setup. Most repairs done in 48 hours.",
        categories: &["technology", "professional-services"],
        street: "55 College Avenue",
        city: "Urbana",
        state: "IL",
        zip: "61801",
        phone: "(217) 555-0135",
        website: Some("https://bytewise.example"),
        founded: 2014,
        accredited_since: Some((2021, 8, 2)),
        weekend: "11:00 AM - 4:00 PM",
    },
    SeedBusiness {
        name: "Corner Street Bakery",
        tagline: "Bread, pastries and coffee from 6 AM.",
        description: "Scratch bakery with sourdough, croissants, custom cakes and locally roasted coffee.",
        categories: &["restaurants", "retail"],
        street: "3 Corner Street",
        city: "Decatur",
        state: "IL",
        zip: "62523",
        phone: "(217) 555-0159",
        website: None,
        founded: 2010,
        accredited_since: None,
        weekend: "7:00 AM - 1:00 PM",
    },
    SeedBusiness {
        name: "Reliable Roofing Co.",
        tagline: "Roof repair and replacement.",
        description: "Residential roofing: inspections, storm damage repair, gutters and full replacements with a ten-year workmanship warranty.",
        categories: &["home-services"],
        street: "1120 Prairie Lane",
        city: "Chatham",
        state: "IL",
        zip: "62629",
        phone: "(217) 555-0104",
        website: Some("https://reliableroofing.example"),
        founded: 1999,
        accredited_since: None,
        weekend: "Closed",
    },
    SeedBusiness {
        name: "Lincoln Family Clinic",
        tagline: "Walk-ins welcome.",
        description: "Primary care clinic offering checkups, vaccinations, sports physicals and walk-in urgent care.",
        categories: &["health-medical"],
        street: "402 Lincoln Boulevard",
        city: "Springfield",
        state: "IL",
        zip: "62702",
        phone: "(217) 555-0170",
        website: None,
        founded: 2011,
        accredited_since: None,
        weekend: "9:00 AM - 1:00 PM",
    },
    SeedBusiness {
        name: "Velvet Hair Studio",
        tagline: "Cuts, color and styling.",
        description: "Hair salon specializing in color, balayage and precision cuts. Bridal parties by appointment.",
        categories: &["beauty-spas"],
        street: "18 Main Street",
        city: "Urbana",
        state: "IL",
        zip: "61802",
        phone: "(217) 555-0148",
        website: None,
        founded: 2018,
        accredited_since: None,
        weekend: "9:00 AM - 4:00 PM",
    },
];

const AUTHORS: &[&str] = &[
    "Maria Garcia",
    "James Walker",
    "Priya Patel",
    "Tom Becker",
    "Linda Osei",
    "Kevin Nguyen",
    "Rachel Stein",
    "Dev Malhotra",
];

/// Rating, title, body.
const REVIEWS: &[(u8, &str, &str)] = &[
    (5, "Outstanding service", "They were on time, explained everything clearly and the price matched the quote exactly. Highly recommended."),
    (4, "Very good overall", "Friendly staff and quality work. Scheduling took a few days longer than I hoped, but the result was worth it."),
    (5, "Could not be happier", "Professional from start to finish. I have already recommended them to two neighbors."),
    (3, "Decent but slow", "The work itself was fine, but communication was spotty and I had to call twice for updates."),
    (5, "Best in town", "I have tried several places over the years and this is the one I keep coming back to."),
    (2, "Disappointing visit", "Long wait and the staff seemed rushed. The owner did follow up afterwards, which I appreciated."),
    (4, "Reliable and fair", "Fair prices and no upselling. They fixed exactly what was needed and nothing more."),
    (1, "Would not return", "Missed the appointment window twice and never called to explain. Took my business elsewhere."),
    (5, "Exceeded expectations", "Went above and beyond, cleaned up afterwards and even followed up a week later to check in."),
    (4, "Great value", "Good quality for the price. Parking is a bit tight but that is not their fault."),
];

fn hours(weekend: &str) -> Vec<BusinessHours> {
    WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, day)| {
            if i < 5 {
                BusinessHours::new(day, "9:00 AM - 6:00 PM")
            } else {
                BusinessHours::new(day, weekend)
            }
        })
        .collect()
}

fn email_for(name: &str) -> String {
    let local: String = crate::domain::slugify(name)
        .split('-')
        .take(2)
        .collect();
    format!("info@{local}.example")
}

/// Load the demo directory: accounts, listings, reviews and profile views.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn seed_demo_data(storage: &Storage) -> Result<SeedSummary> {
    let owner = storage.create_user(&NewUser {
        name: "Morgan Reyes".to_string(),
        email: DEMO_OWNER_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: Role::BusinessOwner,
    })?;
    let customer = storage.create_user(&NewUser {
        name: "Alex Chen".to_string(),
        email: DEMO_CUSTOMER_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: Role::Consumer,
    })?;
    storage.create_user(&NewUser {
        name: "Site Admin".to_string(),
        email: DEMO_ADMIN_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: Role::Admin,
    })?;

    let now = Utc::now();
    let today = now.date_naive();
    let mut review_count = 0;

    for (i, seed) in BUSINESSES.iter().enumerate() {
        let business = storage.insert_business(&NewBusiness {
            name: seed.name.to_string(),
            tagline: seed.tagline.to_string(),
            description: seed.description.to_string(),
            categories: seed.categories.iter().map(ToString::to_string).collect(),
            address: Address {
                street: seed.street.to_string(),
                city: seed.city.to_string(),
                state: seed.state.to_string(),
                zip: seed.zip.to_string(),
            },
            phone: seed.phone.to_string(),
            email: email_for(seed.name),
            website: seed.website.map(ToString::to_string),
            hours: hours(seed.weekend),
            founded: Some(seed.founded),
        })?;

        if let Some(since) = seed
            .accredited_since
            .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        {
            storage.set_accredited(business.id, since)?;
        }

        // Two to five reviews each, spread over the last six months.
        let n = 2 + (i * 3) % 4;
        for j in 0..n {
            let (rating, title, body) = REVIEWS[(i * 3 + j * 7) % REVIEWS.len()];
            let days_ago = i64::try_from(3 + j * 37 + i * 5).unwrap_or(0);
            storage.insert_review_at(
                &NewReview {
                    business_id: business.id,
                    user_id: None,
                    author_name: AUTHORS[(i + j * 3) % AUTHORS.len()].to_string(),
                    rating,
                    title: title.to_string(),
                    body: body.to_string(),
                },
                now - Duration::days(days_ago),
            )?;
            review_count += 1;
        }

        if i == 0 {
            claim_for_demo_owner(storage, business.id, owner.id, today)?;
            storage.insert_review_at(
                &NewReview {
                    business_id: business.id,
                    user_id: Some(customer.id),
                    author_name: "Alex Chen".to_string(),
                    rating: 5,
                    title: "Fixed our water heater in an hour".to_string(),
                    body: "Called in the morning, they arrived before lunch and had hot water running again within the hour.".to_string(),
                },
                now - Duration::days(1),
            )?;
            review_count += 1;
        }
    }

    let summary = SeedSummary {
        businesses: BUSINESSES.len(),
        reviews: review_count,
        users: 3,
    };
    info!(
        "Seeded {} businesses, {} reviews and {} users",
        summary.businesses, summary.reviews, summary.users
    );
    Ok(summary)
}

/// Give the demo owner the first listing, a response on its oldest review
/// and a month of profile views.
fn claim_for_demo_owner(
    storage: &Storage,
    business_id: i64,
    owner_id: i64,
    today: NaiveDate,
) -> Result<()> {
    storage.conn.execute(
        "UPDATE businesses SET owner_id = ?1 WHERE id = ?2",
        rusqlite::params![owner_id, business_id],
    )?;

    let oldest: i64 = storage.conn.query_row(
        "SELECT id FROM reviews WHERE business_id = ?1 ORDER BY created_at ASC LIMIT 1",
        [business_id],
        |row| row.get(0),
    )?;
    storage.respond_to_review(
        oldest,
        owner_id,
        "Thank you for the kind words. We look forward to helping you again.",
    )?;

    for back in 0..30u32 {
        let Some(day) = today.checked_sub_days(chrono::Days::new(u64::from(back))) else {
            continue;
        };
        storage.add_profile_views(business_id, day, 6 + (back * 7) % 11)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BusinessQuery;

    #[test]
    fn test_seed_demo_data() {
        let storage = Storage::open_in_memory().unwrap();
        let summary = seed_demo_data(&storage).unwrap();
        assert_eq!(summary.businesses, BUSINESSES.len());
        assert_eq!(summary.users, 3);

        let stats = storage.stats().unwrap();
        assert_eq!(stats.businesses, BUSINESSES.len() as u64);
        assert_eq!(stats.reviews, summary.reviews as u64);
    }

    #[test]
    fn test_demo_owner_has_a_listing() {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_data(&storage).unwrap();

        let owner = storage
            .authenticate(DEMO_OWNER_EMAIL, DEMO_PASSWORD)
            .unwrap()
            .unwrap();
        let owned = storage.businesses_owned_by(owner.id).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].slug, "summit-plumbing-and-heating");
        assert_eq!(storage.responded_review_count(owned[0].id).unwrap(), 1);

        let analytics = storage
            .business_analytics(&owned[0], Utc::now().date_naive())
            .unwrap();
        assert!(analytics.total_views > 0);
    }

    #[test]
    fn test_every_category_is_used() {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_data(&storage).unwrap();
        for (category, count) in storage.category_counts().unwrap() {
            assert!(count > 0, "no listings in {}", category.slug);
        }
        let accredited = BusinessQuery {
            accredited_only: true,
            ..BusinessQuery::new(50)
        };
        assert!(storage.search_businesses(&accredited).unwrap().pagination.total > 0);
    }

    #[test]
    fn test_email_for() {
        assert_eq!(email_for("Bright Smile Dental"), "info@brightsmile.example");
        assert_eq!(email_for("Velvet"), "info@velvet.example");
    }
}
