//! Static gym reference data: membership plans, weekly classes, hours, equipment.
//!
//! Loaded once at startup and shared read-only. Mapping order is part of the
//! contract (plans cheapest first, days Monday first), so named collections
//! are kept in an [`OrderedMap`] instead of a hash map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use service_core::error::AppError;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// Everything the assistant knows about the gym.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymData {
    pub membership_plans: OrderedMap<MembershipPlan>,
    pub class_schedule: OrderedMap<Vec<String>>,
    pub gym_hours: GymHours,
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub price: String,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymHours {
    pub weekdays: String,
    pub weekends: String,
}

/// String-keyed map that serializes as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace `key`, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

impl GymData {
    /// Read reference data from a JSON file shaped like the `/gym_data` payload.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read gym data from {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid gym data in {}: {}",
                path.display(),
                e
            ))
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for GymData {
    fn default() -> Self {
        let membership_plans = [
            (
                "basic",
                "$29.99/month",
                &["Access to cardio and strength equipment", "Locker room access"][..],
            ),
            (
                "premium",
                "$49.99/month",
                &["All basic benefits", "Group classes", "Personal training session"][..],
            ),
            (
                "elite",
                "$79.99/month",
                &["All premium benefits", "24/7 access", "Nutrition consultation"][..],
            ),
        ]
        .into_iter()
        .map(|(name, price, benefits)| {
            (
                name,
                MembershipPlan {
                    price: price.to_string(),
                    benefits: strings(benefits),
                },
            )
        })
        .collect();

        let class_schedule = [
            ("monday", &["Yoga 9AM", "HIIT 6PM", "Strength Training 7PM"][..]),
            ("tuesday", &["Pilates 8AM", "Cardio Blast 5:30PM", "Zumba 7PM"][..]),
            ("wednesday", &["CrossFit 7AM", "Yoga 12PM", "Boxing 6PM"][..]),
            ("thursday", &["Strength Training 9AM", "Dance Fitness 6PM"][..]),
            ("friday", &["HIIT 8AM", "Yoga 5PM", "Weekend Warrior 7PM"][..]),
            ("saturday", &["Bootcamp 9AM", "Pilates 11AM", "Open Gym 2PM"][..]),
            ("sunday", &["Yoga Flow 10AM", "Recovery Session 4PM"][..]),
        ]
        .into_iter()
        .map(|(day, classes)| (day, strings(classes)))
        .collect();

        Self {
            membership_plans,
            class_schedule,
            gym_hours: GymHours {
                weekdays: "5:00 AM - 11:00 PM".to_string(),
                weekends: "6:00 AM - 10:00 PM".to_string(),
            },
            equipment: strings(&[
                "Treadmills",
                "Elliptical machines",
                "Stationary bikes",
                "Rowing machines",
                "Free weights",
                "Cable machines",
                "Smith machines",
                "Squat racks",
                "Bench press",
                "Dumbbells",
                "Resistance bands",
                "Medicine balls",
            ]),
        }
    }
}
