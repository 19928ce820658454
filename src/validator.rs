//! Allow-list validation of key names.

use std::collections::BTreeSet;

/// Key names known to work on Samsung TVs, without the `KEY_` prefix.
///
/// Taken from the community-maintained Samsung key code table. Pass it to
/// [`KeyValidator::new`] (or use [`KeyValidator::samsung_default`]) to reject
/// typos before any network traffic happens.
pub const SAMSUNG_KEYS: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "11", "12", "4_3", "16_9", "3SPEED", "AD",
    "ADDDEL", "ALT_MHP", "ANGLE", "ANTENA", "ANYNET", "ANYVIEW", "APP_LIST", "ASPECT",
    "AUTO_ARC_ANTENNA_AIR", "AUTO_ARC_ANTENNA_CABLE", "AUTO_ARC_ANTENNA_SATELLITE",
    "AUTO_ARC_ANYNET_AUTO_START", "AUTO_ARC_ANYNET_MODE_OK", "AUTO_ARC_AUTOCOLOR_FAIL",
    "AUTO_ARC_AUTOCOLOR_SUCCESS", "AUTO_ARC_C_FORCE_AGING", "AUTO_ARC_CAPTION_ENG",
    "AUTO_ARC_CAPTION_KOR", "AUTO_ARC_CAPTION_OFF", "AUTO_ARC_CAPTION_ON",
    "AUTO_ARC_JACK_IDENT", "AUTO_ARC_LNA_OFF", "AUTO_ARC_LNA_ON", "AUTO_ARC_PIP_CH_CHANGE",
    "AUTO_ARC_PIP_DOUBLE", "AUTO_ARC_PIP_LARGE", "AUTO_ARC_PIP_LEFT_BOTTOM",
    "AUTO_ARC_PIP_LEFT_TOP", "AUTO_ARC_PIP_RIGHT_BOTTOM", "AUTO_ARC_PIP_RIGHT_TOP",
    "AUTO_ARC_PIP_SMALL", "AUTO_ARC_PIP_SOURCE_CHANGE", "AUTO_ARC_PIP_WIDE", "AUTO_ARC_RESET",
    "AUTO_ARC_USBJACK_INSPECT", "AUTO_FORMAT", "AUTO_PROGRAM", "AV1", "AV2", "AV3", "BACK_MHP",
    "BLUE", "BOOKMARK", "CALLER_ID", "CAPTION", "CATV_MODE", "CHDOWN", "CH_LIST", "CHUP",
    "CLEAR", "CLOCK_DISPLAY", "COMPONENT1", "COMPONENT2", "CONTENTS", "CONVERGENCE",
    "CONVERT_AUDIO_MAINSUB", "CUSTOM", "CYAN", "DEVICE_CONNECT", "DISC_MENU", "DMA", "DNET",
    "DNIe", "DNSe", "DOOR", "DOWN", "DSS_MODE", "DTV", "DTV_LINK", "DTV_SIGNAL", "DVD_MODE",
    "DVI", "DVR", "DVR_MENU", "DYNAMIC", "ENTER", "ENTERTAINMENT", "ESAVING", "EXT1", "EXT10",
    "EXT11", "EXT12", "EXT13", "EXT14", "EXT15", "EXT16", "EXT17", "EXT18", "EXT19", "EXT2",
    "EXT20", "EXT21", "EXT22", "EXT23", "EXT24", "EXT25", "EXT26", "EXT27", "EXT28", "EXT29",
    "EXT3", "EXT30", "EXT31", "EXT32", "EXT33", "EXT34", "EXT35", "EXT36", "EXT37", "EXT38",
    "EXT39", "EXT4", "EXT40", "EXT41", "EXT5", "EXT6", "EXT7", "EXT8", "EXT9", "FACTORY",
    "FAVCH", "FF", "FF_", "FM_RADIO", "GAME", "GREEN", "GUIDE", "HDMI", "HDMI1", "HDMI2",
    "HDMI3", "HDMI4", "HELP", "HOME", "ID_INPUT", "ID_SETUP", "INFO", "INSTANT_REPLAY", "LEFT",
    "LINK", "LIVE", "MAGIC_BRIGHT", "MAGIC_CHANNEL", "MDC", "MENU", "MIC", "MORE", "MOVIE1",
    "MS", "MTS", "MUTE", "NINE_SEPERATE", "OPEN", "PANNEL_CHDOWN", "PANNEL_CHUP",
    "PANNEL_ENTER", "PANNEL_MENU", "PANNEL_POWER", "PANNEL_SOURCE", "PANNEL_VOLDOW",
    "PANNEL_VOLUP", "PANORAMA", "PAUSE", "PCMODE", "PERPECT_FOCUS", "PICTURE_SIZE",
    "PIP_CHDOWN", "PIP_CHUP", "PIP_ONOFF", "PIP_SCAN", "PIP_SIZE", "PIP_SWAP", "PLAY",
    "PLUS100", "PMODE", "POWER", "POWEROFF", "POWERON", "PRECH", "PRINT", "PROGRAM",
    "QUICK_REPLAY", "REC", "RED", "REPEAT", "RESERVED1", "RETURN", "REWIND", "REWIND_", "RIGHT",
    "RSS", "RSURF", "SCALE", "SEFFECT", "SETUP_CLOCK_TIMER", "SLEEP", "SOURCE", "SRS",
    "STANDARD", "STB_MODE", "STILL_PICTURE", "STOP", "SUB_TITLE", "SVIDEO1", "SVIDEO2",
    "SVIDEO3", "TOOLS", "TOPMENU", "TTX_MIX", "TTX_SUBFACE", "TURBO", "TV", "TV_MODE", "UP",
    "VCHIP", "VCR_MODE", "VOLDOWN", "VOLUP", "WHEEL_LEFT", "WHEEL_RIGHT", "W_LINK", "YELLOW",
    "ZOOM1", "ZOOM2", "ZOOM_IN", "ZOOM_MOVE", "ZOOM_OUT",
];

const KEY_PREFIX: &str = "KEY_";

/// Checks key names against a configured allow-list.
///
/// An empty allow-list accepts every name.
#[derive(Debug, Clone, Default)]
pub struct KeyValidator {
    allowed: BTreeSet<String>,
}

impl KeyValidator {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = keys
            .into_iter()
            .map(|k| {
                let key = k.as_ref().trim().to_uppercase();
                strip_key_prefix(&key).to_string()
            })
            .filter(|k| !k.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn samsung_default() -> Self {
        Self::new(SAMSUNG_KEYS.iter().copied())
    }

    /// Returns true if `name` (with any leading `KEY_` removed) is allowed.
    ///
    /// Allow-list entries are stored upper-cased, and the client upper-cases
    /// names before asking, so matching is case-insensitive in practice.
    pub fn is_valid(&self, name: &str) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        self.allowed.contains(strip_key_prefix(name))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

fn strip_key_prefix(name: &str) -> &str {
    name.strip_prefix(KEY_PREFIX).unwrap_or(name)
}
