//! Event Kind Vocabulary
//!
//! The closed set of event kinds the engine publishes and subscribes to.
//! Kinds are grouped into categories; the numeric `index` is dense so the
//! dispatch registry can be a plain vector indexed by kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad grouping of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Player,
    Combat,
    Quest,
    World,
    Inventory,
    Ui,
    State,
    System,
    Input,
    Debug,
}

/// Every event kind known to the engine.
///
/// The enum is closed: publishing or subscribing to a kind outside this
/// set is unrepresentable. Strings entering from configuration go through
/// [`EventKind::from_str`] and fail loudly there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Player events
    PlayerMoved,
    PlayerDamaged,
    PlayerHealed,
    PlayerDied,
    PlayerLeveledUp,

    // Combat events
    CombatStarted,
    CombatEnded,
    AttackPerformed,
    SpellCast,
    EnemySpawned,
    EnemyDied,
    DamageDealt,

    // Quest events
    QuestStarted,
    QuestCompleted,
    QuestFailed,
    ObjectiveUpdated,

    // World and time events
    DayPeriodChanged,
    SeasonChanged,
    DateRollover,
    WeatherChanged,
    TimeSet,
    LocationEntered,
    LocationExited,
    NpcInteraction,

    // Inventory events
    ItemAcquired,
    ItemUsed,
    ItemDropped,
    ItemEquipped,
    ItemUnequipped,
    GoldChanged,

    // UI events
    MenuOpened,
    MenuClosed,
    DialogueStarted,
    DialogueEnded,

    // State stack events
    StatePushed,
    StatePopped,
    StateChanged,
    StackShutdown,

    // System events
    GamePaused,
    GameResumed,
    SaveRequested,
    LoadRequested,
    SettingsChanged,

    // Input events
    KeyPressed,
    KeyReleased,
    PointerMoved,
    ActionTriggered,

    // Debug events
    DebugToggled,
    SnapshotTaken,
}

impl EventKind {
    /// Number of event kinds.
    pub const COUNT: usize = 49;

    /// Dense index of this kind, suitable for vector-indexed registries.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns all kinds in declaration order.
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::PlayerMoved,
            EventKind::PlayerDamaged,
            EventKind::PlayerHealed,
            EventKind::PlayerDied,
            EventKind::PlayerLeveledUp,
            EventKind::CombatStarted,
            EventKind::CombatEnded,
            EventKind::AttackPerformed,
            EventKind::SpellCast,
            EventKind::EnemySpawned,
            EventKind::EnemyDied,
            EventKind::DamageDealt,
            EventKind::QuestStarted,
            EventKind::QuestCompleted,
            EventKind::QuestFailed,
            EventKind::ObjectiveUpdated,
            EventKind::DayPeriodChanged,
            EventKind::SeasonChanged,
            EventKind::DateRollover,
            EventKind::WeatherChanged,
            EventKind::TimeSet,
            EventKind::LocationEntered,
            EventKind::LocationExited,
            EventKind::NpcInteraction,
            EventKind::ItemAcquired,
            EventKind::ItemUsed,
            EventKind::ItemDropped,
            EventKind::ItemEquipped,
            EventKind::ItemUnequipped,
            EventKind::GoldChanged,
            EventKind::MenuOpened,
            EventKind::MenuClosed,
            EventKind::DialogueStarted,
            EventKind::DialogueEnded,
            EventKind::StatePushed,
            EventKind::StatePopped,
            EventKind::StateChanged,
            EventKind::StackShutdown,
            EventKind::GamePaused,
            EventKind::GameResumed,
            EventKind::SaveRequested,
            EventKind::LoadRequested,
            EventKind::SettingsChanged,
            EventKind::KeyPressed,
            EventKind::KeyReleased,
            EventKind::PointerMoved,
            EventKind::ActionTriggered,
            EventKind::DebugToggled,
            EventKind::SnapshotTaken,
        ]
    }

    /// Returns the category this kind belongs to.
    pub fn category(self) -> EventCategory {
        match self {
            EventKind::PlayerMoved
            | EventKind::PlayerDamaged
            | EventKind::PlayerHealed
            | EventKind::PlayerDied
            | EventKind::PlayerLeveledUp => EventCategory::Player,

            EventKind::CombatStarted
            | EventKind::CombatEnded
            | EventKind::AttackPerformed
            | EventKind::SpellCast
            | EventKind::EnemySpawned
            | EventKind::EnemyDied
            | EventKind::DamageDealt => EventCategory::Combat,

            EventKind::QuestStarted
            | EventKind::QuestCompleted
            | EventKind::QuestFailed
            | EventKind::ObjectiveUpdated => EventCategory::Quest,

            EventKind::DayPeriodChanged
            | EventKind::SeasonChanged
            | EventKind::DateRollover
            | EventKind::WeatherChanged
            | EventKind::TimeSet
            | EventKind::LocationEntered
            | EventKind::LocationExited
            | EventKind::NpcInteraction => EventCategory::World,

            EventKind::ItemAcquired
            | EventKind::ItemUsed
            | EventKind::ItemDropped
            | EventKind::ItemEquipped
            | EventKind::ItemUnequipped
            | EventKind::GoldChanged => EventCategory::Inventory,

            EventKind::MenuOpened
            | EventKind::MenuClosed
            | EventKind::DialogueStarted
            | EventKind::DialogueEnded => EventCategory::Ui,

            EventKind::StatePushed
            | EventKind::StatePopped
            | EventKind::StateChanged
            | EventKind::StackShutdown => EventCategory::State,

            EventKind::GamePaused
            | EventKind::GameResumed
            | EventKind::SaveRequested
            | EventKind::LoadRequested
            | EventKind::SettingsChanged => EventCategory::System,

            EventKind::KeyPressed
            | EventKind::KeyReleased
            | EventKind::PointerMoved
            | EventKind::ActionTriggered => EventCategory::Input,

            EventKind::DebugToggled | EventKind::SnapshotTaken => EventCategory::Debug,
        }
    }

    /// Stable snake_case name, identical to the serde encoding.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::PlayerMoved => "player_moved",
            EventKind::PlayerDamaged => "player_damaged",
            EventKind::PlayerHealed => "player_healed",
            EventKind::PlayerDied => "player_died",
            EventKind::PlayerLeveledUp => "player_leveled_up",
            EventKind::CombatStarted => "combat_started",
            EventKind::CombatEnded => "combat_ended",
            EventKind::AttackPerformed => "attack_performed",
            EventKind::SpellCast => "spell_cast",
            EventKind::EnemySpawned => "enemy_spawned",
            EventKind::EnemyDied => "enemy_died",
            EventKind::DamageDealt => "damage_dealt",
            EventKind::QuestStarted => "quest_started",
            EventKind::QuestCompleted => "quest_completed",
            EventKind::QuestFailed => "quest_failed",
            EventKind::ObjectiveUpdated => "objective_updated",
            EventKind::DayPeriodChanged => "day_period_changed",
            EventKind::SeasonChanged => "season_changed",
            EventKind::DateRollover => "date_rollover",
            EventKind::WeatherChanged => "weather_changed",
            EventKind::TimeSet => "time_set",
            EventKind::LocationEntered => "location_entered",
            EventKind::LocationExited => "location_exited",
            EventKind::NpcInteraction => "npc_interaction",
            EventKind::ItemAcquired => "item_acquired",
            EventKind::ItemUsed => "item_used",
            EventKind::ItemDropped => "item_dropped",
            EventKind::ItemEquipped => "item_equipped",
            EventKind::ItemUnequipped => "item_unequipped",
            EventKind::GoldChanged => "gold_changed",
            EventKind::MenuOpened => "menu_opened",
            EventKind::MenuClosed => "menu_closed",
            EventKind::DialogueStarted => "dialogue_started",
            EventKind::DialogueEnded => "dialogue_ended",
            EventKind::StatePushed => "state_pushed",
            EventKind::StatePopped => "state_popped",
            EventKind::StateChanged => "state_changed",
            EventKind::StackShutdown => "stack_shutdown",
            EventKind::GamePaused => "game_paused",
            EventKind::GameResumed => "game_resumed",
            EventKind::SaveRequested => "save_requested",
            EventKind::LoadRequested => "load_requested",
            EventKind::SettingsChanged => "settings_changed",
            EventKind::KeyPressed => "key_pressed",
            EventKind::KeyReleased => "key_released",
            EventKind::PointerMoved => "pointer_moved",
            EventKind::ActionTriggered => "action_triggered",
            EventKind::DebugToggled => "debug_toggled",
            EventKind::SnapshotTaken => "snapshot_taken",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error type for parsing an EventKind from a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseKindError {
    unknown: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: '{}'", self.unknown)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for EventKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        EventKind::all()
            .iter()
            .copied()
            .find(|k| k.name() == lower)
            .ok_or_else(|| ParseKindError {
                unknown: s.to_string(),
            })
    }
}
