//! Static label tables: opcode, tag, RPC and enum ids to display names.
//!
//! These are inert data shared by the dissectors (as display hints) and by
//! any renderer walking the decoded tree.

/// A named table of `value → label` pairs.
#[derive(Debug)]
pub struct LabelTable {
    pub name: &'static str,
    pub entries: &'static [(u64, &'static str)],
}

impl LabelTable {
    pub const fn new(name: &'static str, entries: &'static [(u64, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub fn lookup(&self, value: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == value)
            .map(|(_, label)| *label)
    }

    /// Label for `value`, or `"Unknown"` when absent.
    pub fn label_or_unknown(&self, value: u64) -> &'static str {
        self.lookup(value).unwrap_or("Unknown")
    }
}

pub static OPCODES: LabelTable = LabelTable::new(
    "opcode",
    &[
        (0x00, "Unreliable"),
        (0x01, "Reliable"),
        (0x08, "Hello"),
        (0x09, "Disconnect"),
        (0x0a, "Acknowledge"),
        (0x0c, "Ping"),
    ],
);

pub static PAYLOAD_TAGS: LabelTable = LabelTable::new(
    "payload tag",
    &[
        (0x00, "Host game"),
        (0x01, "Join game"),
        (0x02, "Start game"),
        (0x03, "Remove game"),
        (0x04, "Remove player"),
        (0x05, "Game data"),
        (0x06, "Game data to"),
        (0x07, "Joined game"),
        (0x08, "End game"),
        (0x09, "Get game list (legacy)"),
        (0x0a, "Alter game"),
        (0x0b, "Kick player"),
        (0x0c, "Wait for host"),
        (0x0d, "Redirect"),
        (0x0e, "Master server list"),
        (0x10, "Get game list"),
        (0x11, "Report player"),
    ],
);

pub static MESSAGE_TYPES: LabelTable = LabelTable::new(
    "message type",
    &[
        (0x01, "Data"),
        (0x02, "RPC"),
        (0x04, "Spawn"),
        (0x05, "Despawn"),
        (0x06, "Scene change"),
        (0x07, "Ready"),
        (0x08, "Change settings"),
    ],
);

pub static RPC_IDS: LabelTable = LabelTable::new(
    "rpc",
    &[
        (0x00, "Play animation"),
        (0x01, "Complete task"),
        (0x02, "Sync settings"),
        (0x03, "Set infected"),
        (0x04, "Exiled"),
        (0x05, "Check name"),
        (0x06, "Set name"),
        (0x07, "Check color"),
        (0x08, "Set color"),
        (0x09, "Set hat"),
        (0x0a, "Set skin"),
        (0x0b, "Report dead body"),
        (0x0c, "Murder player"),
        (0x0d, "Send chat"),
        (0x0e, "Start meeting"),
        (0x0f, "Set scanner"),
        (0x10, "Send chat note"),
        (0x11, "Set pet"),
        (0x12, "Set start counter"),
        (0x13, "Enter vent"),
        (0x14, "Exit vent"),
        (0x15, "Snap to"),
        (0x16, "Close"),
        (0x17, "Voting complete"),
        (0x18, "Cast vote"),
        (0x19, "Clear vote"),
        (0x1a, "Add vote"),
        (0x1b, "Close doors of type"),
        (0x1c, "Repair system"),
        (0x1d, "Set tasks"),
        (0x1e, "Update game data"),
    ],
);

pub static SPAWN_TYPES: LabelTable = LabelTable::new(
    "spawn type",
    &[
        (0x00, "Ship status"),
        (0x01, "Meeting hud"),
        (0x02, "Lobby behaviour"),
        (0x03, "Game data"),
        (0x04, "Player"),
        (0x05, "Headquarters"),
        (0x06, "Planet map"),
        (0x07, "April ship status"),
    ],
);

pub static ALTER_TAGS: LabelTable = LabelTable::new("alter tag", &[(0x01, "Change privacy")]);

pub static COLORS: LabelTable = LabelTable::new(
    "color",
    &[
        (0x00, "Red"),
        (0x01, "Blue"),
        (0x02, "Dark green"),
        (0x03, "Pink"),
        (0x04, "Orange"),
        (0x05, "Yellow"),
        (0x06, "Black"),
        (0x07, "White"),
        (0x08, "Purple"),
        (0x09, "Brown"),
        (0x0a, "Cyan"),
        (0x0b, "Lime"),
    ],
);

pub static KILL_DISTANCES: LabelTable = LabelTable::new(
    "kill distance",
    &[(0x00, "Short"), (0x01, "Medium"), (0x02, "Long")],
);

pub static END_GAME_REASONS: LabelTable = LabelTable::new(
    "end game reason",
    &[
        (0x00, "Crewmates won by vote"),
        (0x01, "Crewmates won by tasks"),
        (0x02, "Impostors won by vote"),
        (0x03, "Impostors won by kill"),
        (0x04, "Impostors won by sabotage"),
        (0x05, "Impostor disconnected"),
        (0x06, "Crewmates disconnected"),
    ],
);

pub static GAME_LIST_TAGS: LabelTable =
    LabelTable::new("game list tag", &[(0x00, "List"), (0x01, "Count")]);

pub static MAPS: LabelTable = LabelTable::new(
    "map",
    &[(0x00, "The Skeld"), (0x01, "Mira HQ"), (0x02, "Polus")],
);

pub static NOTE_TYPES: LabelTable = LabelTable::new("note type", &[(0x00, "Vote")]);

pub static TASK_BAR_UPDATES: LabelTable = LabelTable::new(
    "task bar updates",
    &[(0x00, "Always"), (0x01, "In meetings"), (0x02, "Never")],
);

pub static REPORT_REASONS: LabelTable = LabelTable::new(
    "report reason",
    &[
        (0x00, "Inappropriate name"),
        (0x01, "Inappropriate chat"),
        (0x02, "Cheating or hacking"),
        (0x03, "Harassment or misconduct"),
    ],
);

pub static REPORT_OUTCOMES: LabelTable = LabelTable::new(
    "report outcome",
    &[
        (0x00, "Not reported: unknown"),
        (0x01, "Not reported: no account"),
        (0x02, "Not reported: not found"),
        (0x03, "Not reported: rate limit"),
        (0x04, "Reported"),
    ],
);

pub static ANNOUNCEMENT_TAGS: LabelTable = LabelTable::new(
    "announcement tag",
    &[(0x00, "Cache"), (0x01, "Data"), (0x02, "Free weekend")],
);

pub static FREE_WEEKEND_STATES: LabelTable = LabelTable::new(
    "free weekend",
    &[(0x00, "Nothing"), (0x01, "Mira HQ"), (0x02, "Polus")],
);

/// Component names of each spawn type, by component index.
pub static SPAWN_COMPONENTS: &[(u64, &[&str])] = &[
    (0x00, &["Ship status"]),
    (0x01, &["Meeting hud"]),
    (0x02, &["Lobby behaviour"]),
    (0x03, &["Game data", "Vote ban system"]),
    (0x04, &["Player control", "Player physics", "Custom network transform"]),
    (0x05, &["Ship status"]),
    (0x06, &["Ship status"]),
    (0x07, &["Ship status"]),
];

pub fn component_name(spawn_type: u64, index: usize) -> Option<&'static str> {
    SPAWN_COMPONENTS
        .iter()
        .find(|(spawn, _)| *spawn == spawn_type)
        .and_then(|(_, names)| names.get(index).copied())
}

pub static HATS: LabelTable = LabelTable::new(
    "hat",
    &[
        (0x00, "None"),
        (0x01, "Astronaut"),
        (0x02, "BaseballCap"),
        (0x03, "BrainSlug"),
        (0x04, "BushHat"),
        (0x05, "CaptainsHat"),
        (0x06, "DoubleTopHat"),
        (0x07, "Flowerpot"),
        (0x08, "Goggles"),
        (0x09, "HardHat"),
        (0x0a, "Military"),
        (0x0b, "PaperHat"),
        (0x0c, "PartyHat"),
        (0x0d, "Police"),
        (0x0e, "Stethoscope"),
        (0x0f, "TopHat"),
        (0x10, "TowelWizard"),
        (0x11, "Ushanka"),
        (0x12, "Viking"),
        (0x13, "WallCap"),
        (0x14, "Snowman"),
        (0x15, "Reindeer"),
        (0x16, "Lights"),
        (0x17, "Santa"),
        (0x18, "Tree"),
        (0x19, "Present"),
        (0x1a, "Candycanes"),
        (0x1b, "ElfHat"),
        (0x1c, "NewYears2018"),
        (0x1d, "WhiteHat"),
        (0x1e, "Crown"),
        (0x1f, "Eyebrows"),
        (0x20, "HaloHat"),
        (0x21, "HeroCap"),
        (0x22, "PipCap"),
        (0x23, "PlungerHat"),
        (0x24, "ScubaHat"),
        (0x25, "StickminHat"),
        (0x26, "StrawHat"),
        (0x27, "TenGallonHat"),
        (0x28, "ThirdEyeHat"),
        (0x29, "ToiletPaperHat"),
        (0x2a, "Toppat"),
        (0x2b, "Fedora"),
        (0x2c, "Goggles_2"),
        (0x2d, "Headphones"),
        (0x2e, "MaskHat"),
        (0x2f, "PaperMask"),
        (0x30, "Security"),
        (0x31, "StrapHat"),
        (0x32, "Banana"),
        (0x33, "Beanie"),
        (0x34, "Bear"),
        (0x35, "Cheese"),
        (0x36, "Cherry"),
        (0x37, "Egg"),
        (0x38, "Fedora_2"),
        (0x39, "Flamingo"),
        (0x3a, "FlowerPin"),
        (0x3b, "Helmet"),
        (0x3c, "Plant"),
        (0x3d, "BatEyes"),
        (0x3e, "BatWings"),
        (0x3f, "Horns"),
        (0x40, "Mohawk"),
        (0x41, "Pumpkin"),
        (0x42, "ScaryBag"),
        (0x43, "Witch"),
        (0x44, "Wolf"),
        (0x45, "Pirate"),
        (0x46, "Plague"),
        (0x47, "Machete"),
        (0x48, "Fred"),
        (0x49, "MinerCap"),
        (0x4a, "WinterHat"),
        (0x4b, "Archae"),
        (0x4c, "Antenna"),
        (0x4d, "Balloon"),
        (0x4e, "BirdNest"),
        (0x4f, "BlackBelt"),
        (0x50, "Caution"),
        (0x51, "Chef"),
        (0x52, "CopHat"),
        (0x53, "DoRag"),
        (0x54, "DumSticker"),
        (0x55, "Fez"),
        (0x56, "GeneralHat"),
        (0x57, "GreyThing"),
        (0x58, "HunterCap"),
        (0x59, "JungleHat"),
        (0x5a, "MiniCrewmate"),
        (0x5b, "NinjaMask"),
        (0x5c, "RamHorns"),
        (0x5d, "Snowman_2"),
    ],
);

pub static PETS: LabelTable = LabelTable::new(
    "pet",
    &[
        (0x00, "None"),
        (0x01, "Alien"),
        (0x02, "Crewmate"),
        (0x03, "Doggy"),
        (0x04, "Stickmin"),
        (0x05, "Hamster"),
        (0x06, "Robot"),
        (0x07, "UFO"),
        (0x08, "Ellie"),
        (0x09, "Squig"),
        (0x0a, "Bedcrab"),
    ],
);

pub static SKINS: LabelTable = LabelTable::new(
    "skin",
    &[
        (0x00, "None"),
        (0x01, "Astro"),
        (0x02, "Capt"),
        (0x03, "Mech"),
        (0x04, "Military"),
        (0x05, "Police"),
        (0x06, "Science"),
        (0x07, "SuitB"),
        (0x08, "SuitW"),
        (0x09, "Wall"),
        (0x0a, "Hazmat"),
        (0x0b, "Security"),
        (0x0c, "Tarmac"),
        (0x0d, "Miner"),
        (0x0e, "Winter"),
        (0x0f, "Archae"),
    ],
);

pub static TASK_TYPES: LabelTable = LabelTable::new(
    "task type",
    &[
        (0x00, "Submit scan"),
        (0x01, "Prime shields"),
        (0x02, "Fuel engines"),
        (0x03, "Chart course"),
        (0x04, "Start reactor"),
        (0x05, "Swipe card"),
        (0x06, "Clear asteroids"),
        (0x07, "Upload data"),
        (0x08, "Inspect sample"),
        (0x09, "Empty chute"),
        (0x0a, "Empty garbage"),
        (0x0b, "Align engine output"),
        (0x0c, "Fix wiring"),
        (0x0d, "Calibrate distributor"),
        (0x0e, "Divert power"),
        (0x0f, "Unlock manifolds"),
        (0x10, "Reset reactor"),
        (0x11, "Fix lights"),
        (0x12, "Filter"),
        (0x13, "Fix comms"),
        (0x14, "Restore oxygen"),
        (0x15, "Stabilize steering"),
        (0x16, "Assemble artifact"),
        (0x17, "Sort samples"),
        (0x18, "Measure weather"),
        (0x19, "Enter ID code"),
        (0x1a, "Buy beverage"),
        (0x1b, "Process data"),
        (0x1c, "Run diagnostics"),
        (0x1d, "Water plants"),
        (0x1e, "Monitor oxygen"),
        (0x1f, "Store artifact"),
        (0x20, "Fill canisters"),
        (0x21, "Activate weather nodes"),
        (0x22, "Insert keys"),
        (0x23, "Reset seismic"),
        (0x24, "Scan boarding pass"),
        (0x25, "Open waterways"),
        (0x26, "Replace water jug"),
        (0x27, "Repair drill"),
        (0x28, "Align telescope"),
        (0x29, "Record temperature"),
        (0x2a, "Reboot WiFi"),
    ],
);

pub static SYSTEM_TYPES: LabelTable = LabelTable::new(
    "system type",
    &[
        (0x00, "Hallway"),
        (0x01, "Storage"),
        (0x02, "Cafeteria"),
        (0x03, "Reactor"),
        (0x04, "Upper engine"),
        (0x05, "Navigation"),
        (0x06, "Admin"),
        (0x07, "Electrical"),
        (0x08, "Life support"),
        (0x09, "Shields"),
        (0x0a, "Medbay"),
        (0x0b, "Security"),
        (0x0c, "Weapons"),
        (0x0d, "Lower engine"),
        (0x0e, "Communications"),
        (0x0f, "Ship tasks"),
        (0x10, "Doors"),
        (0x11, "Sabotage"),
        (0x12, "Decontamination (Left)"),
        (0x13, "Launchpad"),
        (0x14, "Locker room"),
        (0x15, "Laboratory"),
        (0x16, "Balcony"),
        (0x17, "Office"),
        (0x18, "Greenhouse"),
        (0x19, "Dropship"),
        (0x1a, "Decontamination (Right)"),
        (0x1b, "Outside"),
        (0x1c, "Specimens"),
        (0x1d, "Boiler room"),
    ],
);

pub static DISCONNECT_REASONS: LabelTable = LabelTable::new(
    "disconnect reason",
    &[
        (0x00, "None"),
        (0x01, "Game full"),
        (0x02, "Game started"),
        (0x03, "Game not found"),
        (0x05, "Incorrect version"),
        (0x06, "Banned"),
        (0x07, "Kicked"),
        (0x08, "Custom"),
        (0x09, "Invalid name"),
        (0x0a, "Hacking"),
        (0x10, "Destroy"),
        (0x11, "Error"),
        (0x12, "Incorrect game"),
        (0x13, "Server request"),
        (0x14, "Server full"),
        (0xd0, "Focus lost background"),
        (0xd1, "Intentional leaving"),
        (0xd2, "Focus lost"),
        (0xd3, "New connection"),
    ],
);

pub static LANGUAGES: LabelTable = LabelTable::new(
    "language",
    &[
        (0x00, "Any"),
        (0x01, "Other"),
        (0x02, "Spanish"),
        (0x04, "Korean"),
        (0x08, "Russian"),
        (0x10, "Portuguese"),
        (0x20, "Arabic"),
        (0x40, "Filipino"),
        (0x80, "Polish"),
        (0x100, "English"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_and_misses_unknown() {
        assert_eq!(OPCODES.lookup(0x08), Some("Hello"));
        assert_eq!(OPCODES.lookup(0x02), None);
        assert_eq!(OPCODES.label_or_unknown(0x02), "Unknown");
    }

    #[test]
    fn tables_have_unique_keys() {
        for table in [
            &OPCODES,
            &PAYLOAD_TAGS,
            &MESSAGE_TYPES,
            &RPC_IDS,
            &SPAWN_TYPES,
            &END_GAME_REASONS,
            &HATS,
            &TASK_TYPES,
            &SYSTEM_TYPES,
            &DISCONNECT_REASONS,
        ] {
            let mut keys: Vec<u64> = table.entries.iter().map(|(key, _)| *key).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), table.entries.len(), "{}", table.name);
        }
    }

    #[test]
    fn component_names_by_position() {
        assert_eq!(component_name(0x04, 2), Some("Custom network transform"));
        assert_eq!(component_name(0x03, 1), Some("Vote ban system"));
        assert_eq!(component_name(0x04, 3), None);
        assert_eq!(component_name(0x09, 0), None);
    }
}
