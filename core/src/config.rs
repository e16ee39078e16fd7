use crate::{
    classify::WeekendDays,
    error::ClockResult,
    layout::{default_segment_groups, SegmentGroup, SegmentRef, GRID_COLUMNS},
    registry::parse_flag_codes,
    types::{CardId, ZoneName},
};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_TICK_PERIOD_MS: u64 = 1_000;
pub const DEFAULT_FLAG_URL_TEMPLATE: &str = "https://flagcdn.com/w40/{code}.png";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub id: CardId,
    pub name: String,
    /// Cards without a zone get their static content and nothing else.
    #[serde(default)]
    pub time_zone: Option<ZoneName>,
    /// Either `["sa", "bh"]` or `"sa, bh"`.
    #[serde(default, deserialize_with = "deserialize_flag_codes")]
    pub flags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagCodesField {
    Csv(String),
    List(Vec<String>),
}

fn deserialize_flag_codes<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    Ok(match FlagCodesField::deserialize(de)? {
        FlagCodesField::Csv(raw) => parse_flag_codes(&raw),
        FlagCodesField::List(items) => items.iter().flat_map(|s| parse_flag_codes(s)).collect(),
    })
}

/// The card used as the dashboard's colour anchor, and the bar chip that
/// mirrors its colour every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRegion {
    pub time_zone:  ZoneName,
    pub color:      String,
    pub text_color: String,
    pub mirror:     SegmentRef,
}

impl Default for ReferenceRegion {
    fn default() -> Self {
        Self {
            time_zone:  "Asia/Kolkata".into(),
            color:      "#008000".into(),
            text_color: "white".into(),
            mirror:     SegmentRef { group: 3, segment: 0 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub red_text:         String,
    pub day_background:   String,
    pub day_text:         String,
    pub night_background: String,
    pub night_text:       String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red_text:         "red".into(),
            day_background:   "var(--card-bg)".into(),
            day_text:         "var(--text)".into(),
            night_background: "linear-gradient(145deg, rgba(150, 150, 150, 0.95), rgba(110, 110, 110, 0.9))".into(),
            night_text:       "white".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendOverride {
    pub card_id: CardId,
    pub days:    WeekendDays,
}

/// Fallback for registries keyed only by display name: any card whose name
/// contains `contains` gets `days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameMarker {
    pub contains: String,
    pub days:     WeekendDays,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendConfig {
    #[serde(default)]
    pub default_days: WeekendDays,
    #[serde(default)]
    pub overrides: Vec<WeekendOverride>,
    #[serde(default)]
    pub name_markers: Vec<NameMarker>,
}

impl Default for WeekendConfig {
    fn default() -> Self {
        Self {
            default_days: WeekendDays::DEFAULT,
            overrides:    Vec::new(),
            name_markers: gulf_name_markers(),
        }
    }
}

/// The two Gulf clusters whose weekend is Friday–Saturday.
pub fn gulf_name_markers() -> Vec<NameMarker> {
    ["Saudi Arabia & Bahrain", "Kuwait, Oman, Qatar, UAE"]
        .into_iter()
        .map(|m| NameMarker { contains: m.into(), days: WeekendDays::FRI_SAT })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_grid_columns")]
    pub grid_columns: u8,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    #[serde(default = "default_flag_url_template")]
    pub flag_url_template: String,
    #[serde(default)]
    pub reference: ReferenceRegion,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub weekend: WeekendConfig,
    #[serde(default = "default_segment_groups")]
    pub segment_groups: Vec<SegmentGroup>,
    pub cards: Vec<CardConfig>,
}

fn default_grid_columns() -> u8 { GRID_COLUMNS }
fn default_tick_period_ms() -> u64 { DEFAULT_TICK_PERIOD_MS }
fn default_flag_url_template() -> String { DEFAULT_FLAG_URL_TEMPLATE.into() }

impl DashboardConfig {
    /// Load from `{data_dir}/dashboard.json`.
    /// In tests, use DashboardConfig::default_test().
    pub fn load(data_dir: &str) -> ClockResult<Self> {
        let path = format!("{data_dir}/dashboard.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)?;
        log::info!("loaded {} cards from {path}", config.cards.len());
        Ok(config)
    }

    pub fn from_json(json: &str) -> ClockResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Seven cards, four short bars. Covers every styling branch: the
    /// reference card, both Gulf overrides, and one card with no zone.
    pub fn default_test() -> Self {
        fn card(id: &str, name: &str, tz: Option<&str>, flags: &str) -> CardConfig {
            CardConfig {
                id:        id.into(),
                name:      name.into(),
                time_zone: tz.map(Into::into),
                flags:     parse_flag_codes(flags),
            }
        }

        let mut groups = default_segment_groups();
        for (group, before) in groups.iter_mut().zip([0, 2, 4, 5]) {
            group.before = before;
        }

        Self {
            grid_columns:      GRID_COLUMNS,
            tick_period_ms:    DEFAULT_TICK_PERIOD_MS,
            flag_url_template: DEFAULT_FLAG_URL_TEMPLATE.into(),
            reference:         ReferenceRegion::default(),
            palette:           Palette::default(),
            weekend: WeekendConfig {
                default_days: WeekendDays::DEFAULT,
                overrides: vec![WeekendOverride {
                    card_id: "saudi-bahrain".into(),
                    days:    WeekendDays::FRI_SAT,
                }],
                name_markers: gulf_name_markers(),
            },
            segment_groups: groups,
            cards: vec![
                card("us-east", "USA & Canada (Eastern)", Some("America/New_York"), "us,ca"),
                card("uk-ireland", "UK & Ireland", Some("Europe/London"), "gb, ie"),
                card("saudi-bahrain", "Saudi Arabia & Bahrain", Some("Asia/Riyadh"), "sa,bh"),
                card("gulf", "Kuwait, Oman, Qatar, UAE", Some("Asia/Dubai"), "kw,om,qa,ae"),
                card("india", "India", Some("Asia/Kolkata"), "in"),
                card("japan-korea", "Japan & Korea", Some("Asia/Tokyo"), "jp,kr"),
                card("hq", "Headquarters", None, ""),
            ],
        }
    }
}
