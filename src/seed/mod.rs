use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::info;

/// Fixed so every run without a database file serves the same data.
const SEED: u64 = 0x5EED_DA7A;

static CATEGORIES: &[(&str, &str)] = &[
    ("electronics", "Electronics"),
    ("clothing", "Clothing"),
    ("home-garden", "Home & Garden"),
    ("toys-games", "Toys & Games"),
    ("sports-outdoors", "Sports & Outdoors"),
    ("books", "Books"),
];

static ADJECTIVES: &[&str] = &[
    "Premium", "Deluxe", "Ultra", "Pro", "Classic", "Elite", "Smart", "Eco",
    "Compact", "Portable", "Heavy-Duty", "Lightweight", "Essential", "Signature",
    "Mini", "Turbo", "Silent", "Rapid",
];

static NOUNS: &[&str] = &[
    "Widget", "Gadget", "Speaker", "Lamp", "Backpack", "Jacket", "Kettle",
    "Drone", "Puzzle", "Notebook", "Monitor", "Sensor", "Blender", "Tent",
];

static TAGS: &[&str] = &[
    "new", "bestseller", "eco", "gift", "limited", "wireless", "outdoor", "premium",
];

static USERS: &[(&str, &str)] = &[
    ("Ada Lovelace", "ada"),
    ("Grace Hopper", "grace"),
    ("Alan Turing", "alan"),
    ("Katherine Johnson", "katherine"),
    ("Linus Torvalds", "linus"),
];

static MOVIES: &[(&str, i64, &str)] = &[
    ("The Matrix", 1999, "sci-fi"),
    ("Spirited Away", 2001, "animation"),
    ("Heat", 1995, "crime"),
    ("Arrival", 2016, "sci-fi"),
    ("Parasite", 2019, "thriller"),
    ("Amélie", 2001, "comedy"),
];

/// Generate a product name using adjective + noun + serial suffix.
fn random_product_name(rng: &mut impl Rng, serial: usize) -> String {
    let adj = ADJECTIVES.choose(rng).unwrap_or(&"Standard");
    let noun = NOUNS.choose(rng).unwrap_or(&"Widget");
    format!("{} {} #{:03}", adj, noun, serial)
}

fn random_product(rng: &mut StdRng, id: usize) -> Value {
    let name = random_product_name(rng, id);
    let (category_id, category_name) = CATEGORIES.choose(rng).copied().unwrap_or(CATEGORIES[0]);

    let original_price = rng.gen_range(500..=50_000) as f64 / 100.0;
    let price = if rng.gen_bool(0.35) {
        let discount = rng.gen_range(5..=40) as f64 / 100.0;
        ((original_price * (1.0 - discount)) * 100.0).round() / 100.0
    } else {
        original_price
    };

    let epoch = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single().unwrap_or_default();
    let created_at = epoch + Duration::hours(rng.gen_range(0..(24 * 600)));

    let mut product = json!({
        "id": id,
        "categoryId": category_id,
        "name": name,
        "price": price,
        "originalPrice": original_price,
        "inStock": rng.gen_bool(0.75),
        "rating": (rng.gen_range(10..=50) as f64) / 10.0,
        "createdAt": created_at.to_rfc3339(),
        "image": format!("https://picsum.photos/seed/product-{}/400/400", id),
    });

    // Some records deliberately lack the optional fields.
    if rng.gen_bool(0.8) {
        product["description"] = json!(format!(
            "{} from our {} range.",
            name,
            category_name.to_lowercase()
        ));
    }
    if rng.gen_bool(0.7) {
        let count = rng.gen_range(1..=3);
        let tags: Vec<&str> = TAGS.choose_multiple(rng, count).copied().collect();
        product["tags"] = json!(tags);
    }
    product
}

/// Builds the demo document served when no database file exists: every
/// collection the server knows about, with `product_count` products.
pub fn demo_document(product_count: usize) -> Value {
    let mut rng = StdRng::seed_from_u64(SEED);

    let categories: Vec<Value> = CATEGORIES
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();

    let products: Vec<Value> = (1..=product_count)
        .map(|id| random_product(&mut rng, id))
        .collect();

    let users: Vec<Value> = USERS
        .iter()
        .enumerate()
        .map(|(i, (name, username))| {
            json!({
                "id": i + 1,
                "name": name,
                "username": username,
                "email": format!("{}@example.com", username),
            })
        })
        .collect();

    let mut posts = Vec::new();
    for serial in 1..=USERS.len() * 3 {
        let user_id = rng.gen_range(1..=USERS.len());
        posts.push(json!({
            "id": serial,
            "userId": user_id,
            "title": format!("Post {} by user {}", serial, user_id),
            "body": "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
        }));
    }

    let movies: Vec<Value> = MOVIES
        .iter()
        .enumerate()
        .map(|(i, (title, year, genre))| {
            json!({ "id": i + 1, "title": title, "year": year, "genre": genre })
        })
        .collect();

    let cart: Vec<Value> = (1..=product_count.min(3))
        .map(|product_id| {
            json!({
                "id": product_id,
                "productId": product_id,
                "quantity": rng.gen_range(1..=4),
            })
        })
        .collect();

    info!(
        products = products.len(),
        users = users.len(),
        posts = posts.len(),
        "Generated demo dataset"
    );

    json!({
        "users": users,
        "posts": posts,
        "products": products,
        "categories": categories,
        "movies": movies,
        "cart": cart,
    })
}
