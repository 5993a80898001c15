//! Placeholder records for when every real source is exhausted.
//!
//! Output is seeded from the query (search) or the derived name (detail), so
//! the same input yields the same records. Only the detail reputation score
//! draws from the engine's scorer.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::core::config::FallbackPool;
use crate::core::types::{
    ProfileDetail, ProfileSummary, RelationshipStatus, SocialLinks, SYNTHETIC_SOURCE, UNKNOWN,
    UNKNOWN_PERSON,
};
use crate::discovery::platform::{Platform, SYNTHETIC_REPUTATION};
use crate::discovery::reputation::ReputationScorer;
use crate::extract::avatar_url;
use crate::extract::name::{handle, slugify};

fn seed_for(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.trim().to_lowercase().hash(&mut hasher);
    hasher.finish()
}

fn pick(pool: &[String], seed: u64, idx: usize) -> String {
    if pool.is_empty() {
        return UNKNOWN.to_string();
    }
    let start = (seed % pool.len() as u64) as usize;
    pool[(start + idx) % pool.len()].clone()
}

/// Seeded placeholder fields shared by search and detail output.
struct Persona {
    company: String,
    role: String,
    location: String,
}

impl Persona {
    fn new(pool: &FallbackPool, seed: u64, idx: usize) -> Self {
        Self {
            company: pick(&pool.companies, seed, idx),
            role: pick(&pool.roles, seed >> 16, idx),
            location: pick(&pool.locations, seed >> 32, idx),
        }
    }
}

/// Spreadsheet-style record label: `A`..`Z`, then `AA`, `AB`, ...
fn suffix(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (idx % 26) as u8));
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// `min(limit, pool.max_results)` records whose names all contain `query`.
///
/// A pool with `max_results == 0` still yields one record, so the result is
/// never empty for `limit > 0`.
pub fn generate(pool: &FallbackPool, query: &str, limit: usize) -> Vec<ProfileSummary> {
    let query = query.trim();
    let count = limit.min(pool.max_results.max(1));
    let seed = seed_for(&query.split_whitespace().collect::<Vec<_>>().join(" "));

    (0..count)
        .map(|i| {
            let name = format!("{} {}", query, suffix(i));
            let persona = Persona::new(pool, seed, i);
            ProfileSummary {
                profile_url: format!("https://www.linkedin.com/in/{}", slugify(&name)),
                profile_image: avatar_url(&name),
                bio: format!(
                    "{} is a {} at {} based in {}.",
                    name, persona.role, persona.company, persona.location
                ),
                name,
                company: persona.company,
                role: persona.role,
                location: persona.location,
                source: SYNTHETIC_SOURCE.to_string(),
                synthetic: true,
            }
        })
        .collect()
}

/// Platform-flavoured placeholder detail for `url`, seeded by `name`.
pub fn detail(
    pool: &FallbackPool,
    scorer: &mut ReputationScorer,
    platform: Platform,
    url: &str,
    name: &str,
) -> ProfileDetail {
    let name = if name.trim().is_empty() {
        UNKNOWN_PERSON.to_string()
    } else {
        name.trim().to_string()
    };
    let seed = seed_for(&name);
    let persona = Persona::new(pool, seed, 0);
    let user = handle(&name);

    let bio = match platform {
        Platform::ProfessionalNetwork => format!(
            "{} is a {} at {} based in {}.",
            name, persona.role, persona.company, persona.location
        ),
        Platform::Microblog => format!(
            "{} at {}. Posts about work, tech and everything in between.",
            persona.role, persona.company
        ),
        Platform::CodeHosting => format!(
            "{} at {}. Open source contributor.",
            persona.role, persona.company
        ),
        Platform::Generic => format!(
            "{} is a professional with expertise in technology and innovation.",
            name
        ),
    };

    let mut social_links = SocialLinks::default();
    match platform {
        Platform::ProfessionalNetwork => social_links.linkedin = Some(url.to_string()),
        Platform::Microblog => social_links.twitter = Some(url.to_string()),
        Platform::CodeHosting => social_links.github = Some(url.to_string()),
        Platform::Generic => {}
    }
    // Bits of the seed decide which other profiles the placeholder "has".
    if seed & 0b01 == 0 {
        social_links.absorb(&format!("https://twitter.com/{}", user));
    }
    if seed & 0b10 == 0 {
        social_links.absorb(&format!("https://github.com/{}", user));
    }

    let relationship_status = RelationshipStatus::ALL[(seed >> 8) as usize % RelationshipStatus::ALL.len()];
    let phone = format!("+1{:010}", 2_000_000_000 + (seed >> 12) % 7_999_999_999);

    ProfileDetail {
        email: format!("{}@example.com", slugify(&name).replace('-', ".")),
        phone,
        website: format!("https://{}.com", user),
        profile_image: avatar_url(&name),
        profile_url: url.to_string(),
        bio,
        name,
        company: persona.company,
        role: persona.role,
        location: persona.location,
        social_links,
        relationship_status,
        reputation_score: scorer.score(SYNTHETIC_REPUTATION),
        source: SYNTHETIC_SOURCE.to_string(),
        synthetic: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_bounded_by_pool() {
        let pool = FallbackPool::default();
        assert_eq!(generate(&pool, "Jane", 3).len(), 3);
        assert_eq!(generate(&pool, "Jane", 50).len(), 5);
        assert!(generate(&pool, "Jane", 0).is_empty());

        let tiny = FallbackPool {
            max_results: 0,
            ..FallbackPool::default()
        };
        assert_eq!(generate(&tiny, "Jane", 4).len(), 1);
    }

    #[test]
    fn names_carry_the_query() {
        let out = generate(&FallbackPool::default(), "  Grace   Hopper ", 5);
        assert!(out.iter().all(|p| p.name.contains("Grace   Hopper")));
        assert!(out.iter().all(|p| p.synthetic && p.source == SYNTHETIC_SOURCE));
        assert_eq!(out[0].name, "Grace   Hopper A");
        assert_eq!(out[1].profile_url, "https://www.linkedin.com/in/grace-hopper-b");
    }

    #[test]
    fn large_pools_keep_names_distinct() {
        assert_eq!(suffix(0), "A");
        assert_eq!(suffix(25), "Z");
        assert_eq!(suffix(26), "AA");
        assert_eq!(suffix(27), "AB");
        assert_eq!(suffix(701), "ZZ");
        assert_eq!(suffix(702), "AAA");

        let pool = FallbackPool {
            max_results: 30,
            ..FallbackPool::default()
        };
        let out = generate(&pool, "Ada", 30);
        assert_eq!(out.len(), 30);
        let urls: std::collections::HashSet<_> = out.iter().map(|p| p.profile_url.as_str()).collect();
        assert_eq!(urls.len(), 30);
        assert_eq!(out[26].name, "Ada AA");
    }

    #[test]
    fn same_query_same_records() {
        let pool = FallbackPool::default();
        assert_eq!(generate(&pool, "Ada", 5), generate(&pool, "Ada", 5));

        // Seeding ignores case.
        let upper: Vec<_> = generate(&pool, "ADA", 5).into_iter().map(|p| p.company).collect();
        let lower: Vec<_> = generate(&pool, "ada", 5).into_iter().map(|p| p.company).collect();
        assert_eq!(upper, lower);
    }

    #[test]
    fn pools_rotate_and_empty_pools_degrade() {
        let pool = FallbackPool {
            companies: vec!["Acme".into(), "Globex".into()],
            roles: vec![],
            locations: vec!["Remote".into()],
            max_results: 4,
        };
        let out = generate(&pool, "Sam", 4);
        let companies: Vec<_> = out.iter().map(|p| p.company.as_str()).collect();
        assert_eq!(companies[0], companies[2]);
        assert_ne!(companies[0], companies[1]);
        assert!(out.iter().all(|p| p.role == UNKNOWN && p.location == "Remote"));
    }

    #[test]
    fn detail_is_platform_flavoured() {
        let pool = FallbackPool::default();
        let mut scorer = ReputationScorer::new(Some(1));
        let url = "https://github.com/janedoe";
        let d = detail(&pool, &mut scorer, Platform::CodeHosting, url, "Jane Doe");
        assert_eq!(d.name, "Jane Doe");
        assert_eq!(d.social_links.github.as_deref(), Some(url));
        assert_eq!(d.email, "jane.doe@example.com");
        assert!(d.phone.starts_with("+1") && d.phone.len() == 12);
        assert!((1..=100).contains(&d.reputation_score));
        assert!(d.synthetic);

        let again = detail(&pool, &mut scorer, Platform::CodeHosting, url, "Jane Doe");
        assert_eq!(d.company, again.company);
        assert_eq!(d.relationship_status, again.relationship_status);
    }

    #[test]
    fn blank_name_becomes_unknown_person() {
        let mut scorer = ReputationScorer::new(Some(1));
        let d = detail(
            &FallbackPool::default(),
            &mut scorer,
            Platform::Generic,
            "https://example.com",
            "  ",
        );
        assert_eq!(d.name, UNKNOWN_PERSON);
        assert!(d.social_links.linkedin.is_none());
    }
}
