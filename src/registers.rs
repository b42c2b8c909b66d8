//! The reverse-engineered register map of the Aurora ABC board.
//!
//! Everything in here is static data fixed at build time. The tables are
//! plain shared slices and can be read from any number of threads at once.

/// How the raw register words of a catalog entry are to be interpreted.
///
/// Every data type consumes a fixed number of words (see
/// [`DataType::word_count`]). Multi-word values are big-endian at both the
/// word level and the byte-within-word level: word 0 is most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    U16,
    I16,
    U32,
    I32,
    /// Unsigned fixed-point value, to be divided by the given divisor.
    U16Scaled(u16),
    /// Signed fixed-point value, to be divided by the given divisor.
    I16Scaled(u16),
    /// Fixed-width ASCII text spanning the given number of words.
    Str(usize),
    /// Code looked up in one of the static enumeration tables.
    Enum(EnumTable),
}

impl DataType {
    /// The exact number of raw words this data type decodes from.
    pub const fn word_count(self) -> usize {
        match self {
            Self::U16 | Self::I16 | Self::U16Scaled(_) | Self::I16Scaled(_) | Self::Enum(_) => 1,
            Self::U32 | Self::I32 => 2,
            Self::Str(words) => words,
        }
    }

    /// Decode exactly [`DataType::word_count`] raw words into a [`Value`].
    ///
    /// Callers are responsible for supplying the right number of words;
    /// anything else is a framing bug and panics. The only data-dependent
    /// failure is non-ASCII text in a [`DataType::Str`] register.
    pub fn decode(self, words: &[u16]) -> Result<Value, NonAsciiByte> {
        assert_eq!(
            words.len(),
            self.word_count(),
            "word count contract violated for {self}",
        );
        Ok(match self {
            Self::U16 => Value::U16(words[0]),
            Self::I16 => Value::I16(words[0] as i16),
            Self::U32 => Value::U32((u32::from(words[0]) << 16) | u32::from(words[1])),
            Self::I32 => Value::I32(((u32::from(words[0]) << 16) | u32::from(words[1])) as i32),
            Self::U16Scaled(divisor) => Value::Scaled(f64::from(words[0]) / f64::from(divisor)),
            Self::I16Scaled(divisor) => {
                Value::Scaled(f64::from(words[0] as i16) / f64::from(divisor))
            }
            Self::Str(_) => {
                let bytes = words_to_bytes(words);
                if let Some(position) = bytes.iter().position(|byte| !byte.is_ascii()) {
                    return Err(NonAsciiByte { byte: bytes[position], position });
                }
                Value::Text(bytes.iter().map(|&byte| byte as char).collect())
            }
            Self::Enum(table) => Value::Label(table.label(words[0])),
        })
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::U16 => f.write_str("u16"),
            Self::I16 => f.write_str("i16"),
            Self::U32 => f.write_str("u32"),
            Self::I32 => f.write_str("i32"),
            Self::U16Scaled(divisor) => f.write_fmt(format_args!("u16/{divisor}")),
            Self::I16Scaled(divisor) => f.write_fmt(format_args!("i16/{divisor}")),
            Self::Str(words) => f.write_fmt(format_args!("str{words}")),
            Self::Enum(EnumTable::BrineType) => f.write_str("brine"),
        }
    }
}

impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Static mappings from raw register codes to named states.
///
/// Codes absent from a table decode to the `"Unknown"` sentinel rather than
/// failing, so firmware revisions that introduce new codes keep decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTable {
    BrineType,
}

impl EnumTable {
    pub fn label(self, code: u16) -> &'static str {
        let known: &[(u16, &'static str)] = match self {
            Self::BrineType => &[(485, "Antifreeze")],
        };
        known
            .iter()
            .find_map(|&(known_code, label)| (known_code == code).then_some(label))
            .unwrap_or("Unknown")
    }
}

/// A string register contained a byte outside the ASCII range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("byte {byte:#04x} at text offset {position} is not ASCII")]
pub struct NonAsciiByte {
    pub byte: u8,
    pub position: usize,
}

/// Register words laid out as a big-endian byte sequence.
pub fn words_to_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    /// A fixed-point register already divided by its divisor.
    Scaled(f64),
    /// Fixed-width ASCII text, returned exactly as stored (no trimming).
    Text(String),
    /// The name of an enumerated state, or `"Unknown"`.
    Label(&'static str),
    /// Words of a register whose interpretation is not documented.
    Raw(Vec<u16>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::U16(n) => f.write_fmt(format_args!("{n}")),
            Value::I16(n) => f.write_fmt(format_args!("{n}")),
            Value::U32(n) => f.write_fmt(format_args!("{n}")),
            Value::I32(n) => f.write_fmt(format_args!("{n}")),
            Value::Scaled(n) => f.write_fmt(format_args!("{n}")),
            Value::Text(text) => f.write_str(text),
            Value::Label(label) => f.write_str(label),
            Value::Raw(words) => {
                for (index, word) in words.iter().enumerate() {
                    if index != 0 {
                        f.write_str(" ")?;
                    }
                    f.write_fmt(format_args!("{word:#06x}"))?;
                }
                Ok(())
            }
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::U16(n) => serializer.serialize_u16(*n),
            Value::I16(n) => serializer.serialize_i16(*n),
            Value::U32(n) => serializer.serialize_u32(*n),
            Value::I32(n) => serializer.serialize_i32(*n),
            Value::Scaled(n) => serializer.serialize_f64(*n),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Label(label) => serializer.serialize_str(label),
            Value::Raw(words) => words.serialize(serializer),
        }
    }
}

/// A resolved position in the register catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterIndex(usize);

impl RegisterIndex {
    pub fn from_address(address: u16) -> Option<RegisterIndex> {
        let index = ADDRESSES.partition_point(|v| *v < address);
        (ADDRESSES.get(index) == Some(&address)).then_some(Self(index))
    }

    /// The first catalog entry carrying this display name.
    ///
    /// Names are not unique; the ABC exposes e.g. "Suction Pressure" at
    /// several addresses across drive generations.
    pub fn from_name(name: &str) -> Option<RegisterIndex> {
        NAMES.iter().position(|v| *v == name).map(Self)
    }

    pub fn all() -> impl Iterator<Item = RegisterIndex> {
        (0..ADDRESSES.len()).map(Self)
    }

    pub fn address(&self) -> u16 {
        ADDRESSES[self.0]
    }

    pub fn name(&self) -> &'static str {
        NAMES[self.0]
    }

    /// `None` means the address is known to exist but how to interpret its
    /// contents has not been reverse-engineered. Such registers are passed
    /// through as [`Value::Raw`].
    pub fn data_type(&self) -> Option<DataType> {
        DATA_TYPES[self.0]
    }

    pub fn unit(&self) -> Option<&'static str> {
        UNITS[self.0]
    }

    pub fn description(&self) -> &'static str {
        DESCRIPTIONS[self.0]
    }

    /// Words occupied by this entry; registers without a known data type are
    /// read as a single word.
    pub fn word_count(&self) -> usize {
        self.data_type().map_or(1, DataType::word_count)
    }
}

// Convenience aliases for the nicely tabulated `for_each_register` macro
// definition below, named after the type tags used in the protocol notes.
mod alias {
    use super::{DataType, EnumTable};

    pub const U16: Option<DataType> = Some(DataType::U16);
    pub const I16: Option<DataType> = Some(DataType::I16);
    pub const U32: Option<DataType> = Some(DataType::U32);
    pub const I32: Option<DataType> = Some(DataType::I32);
    pub const U16_DIV10: Option<DataType> = Some(DataType::U16Scaled(10));
    pub const U16_DIV100: Option<DataType> = Some(DataType::U16Scaled(100));
    pub const I16_DIV10: Option<DataType> = Some(DataType::I16Scaled(10));
    pub const STR4: Option<DataType> = Some(DataType::Str(4));
    pub const STR5: Option<DataType> = Some(DataType::Str(5));
    pub const STR8: Option<DataType> = Some(DataType::Str(8));
    pub const STR12: Option<DataType> = Some(DataType::Str(12));
    pub const STR13: Option<DataType> = Some(DataType::Str(13));
    pub const BRINE: Option<DataType> = Some(DataType::Enum(EnumTable::BrineType));
    /// Address answers with data but the interpretation is undocumented.
    pub const RAW: Option<DataType> = None;
}

macro_rules! for_each_register {
    ($m:ident) => {
        $m! {
            0: RAW, "Test Mode Flag";
            1: RAW, "Random Start Delay";
            2: U16_DIV100, "ABC Program Version";
            3: U16_DIV100, "??? Version?";
            4: RAW, "DIP Switch Override";
            6: RAW, "Compressor Anti-Short Cycle Delay";
            8: RAW, "ABC Program Revision";
            9: RAW, "Compressor Minimum Run Time";
            15: RAW, "Blower Off Delay";
            16: U16, "Line Voltage", unit = "V";
            17: RAW, "Aux/E Heat Staging Delay";
            19: I16_DIV10, "Cooling Liquid Line Temperature (FP1)";
            20: I16_DIV10, "Air Coil Temperature (FP2)";
            21: RAW, "Condensate";
            25: RAW, "Last Fault Number";
            26: RAW, "Last Lockout";
            27: RAW, "System Outputs (At Last Lockout)";
            28: RAW, "System Inputs (At Last Lockout)";
            30: RAW, "System Outputs";
            31: RAW, "Status";
            32: RAW, "Thermostat Input Override";
            33: RAW, "DIP Switch Status";
            36: RAW, "ABC Board Rev";
            45: RAW, "Test Mode (write)";
            47: RAW, "Clear Fault History";
            50: RAW, "ECM Speed Low (== 5)";
            51: RAW, "ECM Speed Med (== 5)";
            52: RAW, "ECM Speed High (== 5)";
            54: RAW, "ECM Speed Actual";
            84: RAW, "Slow Opening Water Valve Delay";
            85: RAW, "Test Mode Timer";
            88: STR4, "ABC Program";
            92: STR12, "Model Number";
            105: STR5, "Serial Number";
            110: RAW, "Reheat Delay";
            112: U16, "Line Voltage Setting", unit = "V";
            201: RAW, "Discharge Pressure";
            203: RAW, "Suction Pressure";
            205: RAW, "Discharge Temperature";
            207: RAW, "Loop Entering Water Temperature";
            209: RAW, "Compressor Ambient Temperature";
            211: RAW, "VS Drive Details (General 1)";
            212: RAW, "VS Drive Details (General 2)";
            213: RAW, "VS Drive Details (Derate 1)";
            214: RAW, "VS Drive Details (Derate 2)";
            215: RAW, "VS Drive Details (Safemode 1)";
            216: RAW, "VS Drive Details (Safemode 2)";
            217: RAW, "VS Drive Details (Alarm 1)";
            218: RAW, "VS Drive Details (Alarm 2)";
            280: RAW, "EEV2 Ctl";
            281: RAW, "EEV Superheat";
            282: RAW, "EEV Open %";
            283: RAW, "Suction Temperature";
            284: RAW, "Saturated Suction Temperature";
            321: RAW, "VS Pump Min";
            322: RAW, "VS Pump Max";
            323: RAW, "VS Pump Speed Manual Control";
            325: RAW, "VS Pump Output";
            326: RAW, "VS Pump Fault";
            340: RAW, "Blower Only Speed";
            341: RAW, "Lo Compressor ECM Speed";
            342: RAW, "Hi Compressor ECM Speed";
            344: RAW, "ECM Speed";
            346: I16, "Cooling Airflow Adjustment";
            347: RAW, "Aux Heat ECM Speed";
            362: RAW, "Active Dehumidify";
            400: RAW, "DHW Enabled";
            401: U16_DIV10, "DHW Setpoint";
            402: BRINE, "Brine Type";
            403: RAW, "Flow Meter Type";
            404: RAW, "Blower Type";
            405: RAW, "SmartGrid Trigger";
            406: RAW, "SmartGrid Action";
            407: RAW, "Off Time Length";
            408: RAW, "HA Alarm 1 Trigger";
            409: RAW, "HA Alarm 1 Action";
            410: RAW, "HA Alarm 2 Trigger";
            411: RAW, "HA Alarm 2 Action";
            412: RAW, "Energy Monitor";
            413: RAW, "Pump Type";
            414: RAW, "On Peak/SmartGrid";
            416: RAW, "Energy Phase Type";
            417: U16_DIV100, "Power Adjustment Factor L";
            418: U16_DIV100, "Power Adjustment Factor H";
            419: U16_DIV10, "Loop Pressure Trip";
            460: RAW, "IZ2 Heartbeat?";
            461: RAW, "IZ2 Heartbeat?";
            462: RAW, "IZ2 Status";
            483: RAW, "Number of IZ2 Zones";
            501: I16_DIV10, "Set Point";
            502: I16_DIV10, "Ambient Temperature";
            564: RAW, "IZ2 Compressor Speed Desired";
            565: RAW, "IZ2 Blower % Desired";
            567: I16_DIV10, "Entering Air";
            710: RAW, "Fault Description";
            740: I16_DIV10, "Entering Air";
            741: RAW, "Relative Humidity";
            745: U16_DIV10, "Heating Set Point";
            746: U16_DIV10, "Cooling Set Point";
            747: I16_DIV10, "Ambient Temperature";
            800: RAW, "Thermostat Installed";
            801: U16_DIV100, "Thermostat Version";
            802: RAW, "Thermostat Revision";
            803: RAW, "??? Installed";
            804: U16_DIV100, "??? Version";
            805: RAW, "??? Revision";
            806: RAW, "AXB Installed";
            807: U16_DIV100, "AXB Version";
            808: RAW, "AXB Revision";
            809: RAW, "AHB Installed";
            810: RAW, "AHB Version";
            811: RAW, "AHB Revision";
            812: RAW, "IZ2 Installed";
            813: U16_DIV100, "IZ2 Version";
            814: RAW, "IZ2 Revision";
            815: RAW, "AOC Installed";
            816: U16_DIV100, "AOC Version";
            817: U16_DIV100, "AOC Revision";
            818: RAW, "MOC Installed";
            819: U16_DIV100, "MOC Version";
            820: U16_DIV100, "MOC Revision";
            824: RAW, "EEV2 Installed";
            825: U16_DIV100, "EEV2 Version";
            826: RAW, "EEV2 Revision";
            827: RAW, "AWL Installed";
            828: U16_DIV100, "AWL Version";
            829: RAW, "AWL Revision";
            900: I16_DIV10, "Leaving Air";
            901: U16_DIV10, "Suction Pressure";
            903: I16_DIV10, "SuperHeat Temperature";
            908: RAW, "EEV Open %";
            909: RAW, "SubCooling (Cooling)";
            1103: RAW, "AXB Inputs";
            1104: RAW, "AXB Outputs";
            1105: U16_DIV10, "Blower Amps", unit = "A";
            1106: U16_DIV10, "Aux Amps", unit = "A";
            1107: U16_DIV10, "Compressor 1 Amps", unit = "A";
            1108: U16_DIV10, "Compressor 2 Amps", unit = "A";
            1109: I16_DIV10, "Heating Liquid Line Temperature";
            1110: I16_DIV10, "Leaving Water";
            1111: I16_DIV10, "Entering Water";
            1112: I16_DIV10, "Leaving Air Temperature";
            1113: I16_DIV10, "Suction Temperature";
            1114: I16_DIV10, "DHW Temperature";
            1115: U16_DIV10, "Discharge Pressure";
            1116: U16_DIV10, "Suction Pressure";
            1117: U16_DIV10, "Waterflow";
            1119: U16_DIV10, "Loop Pressure";
            1124: I16_DIV10, "Saturated Evaporator Temperature";
            1125: I16_DIV10, "SuperHeat";
            1126: RAW, "Vaport Injector Open %";
            1134: I16_DIV10, "Saturated Condensor Discharge Temperature";
            1135: I16_DIV10, "SubCooling (Heating)";
            1136: I16_DIV10, "SubCooling (Cooling)";
            1146: U32, "Compressor Watts", unit = "W";
            1148: U32, "Blower Watts", unit = "W";
            1150: U32, "Aux Watts", unit = "W";
            1152: U32, "Total Watts", unit = "W";
            1154: I32, "Heat of Extraction", unit = "W";
            1156: I32, "Heat of Rejection", unit = "W";
            1164: U32, "Pump Watts", unit = "W";
            3000: RAW, "Compressor Speed Desired";
            3001: RAW, "Compressor Speed Actual";
            3002: RAW, "Manual Operation";
            3027: RAW, "Compressor Speed";
            3220: RAW, "VS Drive Details (General 1)";
            3221: RAW, "VS Drive Details (General 2)";
            3222: RAW, "VS Drive Details (Derate 1)";
            3223: RAW, "VS Drive Details (Derate 2)";
            3224: RAW, "VS Drive Details (Safemode 1)";
            3225: RAW, "VS Drive Details (Safemode 2)";
            3226: RAW, "VS Drive Details (Alarm 1)";
            3227: RAW, "VS Drive Details (Alarm 2)";
            3322: U16_DIV10, "VS Drive Discharge Pressure";
            3323: U16_DIV10, "VS Drive Suction Pressure";
            3325: I16_DIV10, "VS Drive Discharge Temperature";
            3326: I16_DIV10, "VS Drive Compressor Ambient Temperature";
            3327: I16_DIV10, "VS Drive Temperature";
            3330: I16_DIV10, "VS Drive Entering Water Temperature";
            3331: RAW, "VS Drive Line Voltage";
            3332: RAW, "VS Drive Thermo Power";
            3422: U32, "VS Drive Compressor Power";
            3424: U32, "VS Drive Supply Voltage";
            3522: I16_DIV10, "VS Drive Inverter Temperature";
            3523: RAW, "VS Drive UDC Voltage";
            3524: RAW, "VS Drive Fan Speed";
            3804: RAW, "VS Drive Details (EEV2 Ctl)";
            3808: RAW, "VS Drive EEV2 % Open";
            3903: I16_DIV10, "VS Drive Suction Temperature";
            3904: RAW, "VS Drive Leaving Air Temperature?";
            3905: I16_DIV10, "VS Drive Saturated Evaporator Discharge Temperature";
            3906: I16_DIV10, "VS Drive SuperHeat Temperature";
            12005: RAW, "Fan Configuration";
            12006: RAW, "Heating Mode";
            12309: RAW, "De/Humidifier Mode";
            12310: RAW, "De/Humidifier Setpoints";
            12606: RAW, "Heating Mode (write)";
            12619: U16_DIV10, "Heating Setpoint (write)";
            12620: U16_DIV10, "Cooling Setpoint (write)";
            12621: RAW, "Fan Mode (write)";
            12622: RAW, "Intermittent Fan On Time (write)";
            12623: RAW, "Intermittent Fan Off Time (write)";
            21114: RAW, "IZ2 De/Humidifier Mode (write)";
            21115: RAW, "IZ2 De/Humidifier Setpoints (write)";
            31003: I16_DIV10, "Outdoor Temp";
            31005: RAW, "IZ2 Demand";
            31109: RAW, "De/Humidifier Mode";
            31110: RAW, "Manual De/Humidification Setpoints";
            31400: STR13, "Dealer Name";
            31413: STR8, "Dealer Phone";
            31421: STR13, "Dealer Address 1";
            31434: STR13, "Dealer Address 2";
            31447: STR13, "Dealer Email";
            31460: STR13, "Dealer Website";
        }
    };
}

macro_rules! optional {
    () => {
        None
    };
    ($($lit: tt)+) => {
        Some($($lit)*)
    };
}

macro_rules! make_lists {
    ($($regnum: literal: $dt: ident, $name: literal $(, unit = $unit: literal)?;)+) => {
        pub static ADDRESSES: &[u16] = &[$($regnum),*];
        pub static NAMES: &[&str] = &[$($name),*];
        pub static DATA_TYPES: &[Option<DataType>] = &[$(alias::$dt),*];
        pub static UNITS: &[Option<&str>] = &[$(optional!($($unit)?)),*];
    };
}

for_each_register!(make_lists);

pub static DESCRIPTIONS: &[&str] = &const {
    let mut result = [""; ADDRESSES.len()];
    let mut index = 0;
    let mut previous_address = 0;
    while index < result.len() {
        let address = ADDRESSES[index];
        if index != 0 && address <= previous_address {
            panic!("ADDRESSES is not sorted (or has duplicate values)!");
        }
        previous_address = address;
        result[index] = match address {
            0 => "0x100 for enabled; this might have other flags",
            17 => {
                "How long aux/eheat have been requested, in seconds. Stages up to EH2 after \
                 130s in eheat mode, or after 310s in aux mode."
            }
            21 => ">= 270 normal, otherwise fault",
            25 => "High bit set if locked out",
            45 => "Write 1 to enable",
            47 => "Write 0x5555 to clear",
            201 => "Raw representation is not understood",
            281 | 283 | 284 => "Data format is not understood",
            362 => "Any non-zero value is true",
            406 => "0/1 for action 1/2; see register 414",
            412 => "0=None, 1=Compressor Monitor, 2=Energy Monitor",
            414 => "0x0001 only",
            462 => "5 when online; 1 when in setup mode",
            501 => "Only read by the AID tool; this is not the heating/cooling set point",
            747 => "From the communicating thermostat; reads 0 when the mode is off",
            1119 => "Only valid below 1000 psi",
            3000 => "Combines thermostat/IZ2 desired speed with the manual operation override",
            3001 => {
                "Actual speed; can differ from the desired speed during a ramp, or during the \
                 periodic ramp up to speed 6 that is not visible in the desired speed"
            }
            _ => "",
        };
        index += 1;
    }
    result
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_lookup_resolves_known_registers() {
        let register = RegisterIndex::from_address(16).unwrap();
        assert_eq!(register.address(), 16);
        assert_eq!(register.name(), "Line Voltage");
        assert_eq!(register.data_type(), Some(DataType::U16));
        assert_eq!(register.unit(), Some("V"));
    }

    #[test]
    fn absent_address_is_distinct_from_unknown_decoding() {
        // 5 is inside a valid range but not documented at all.
        assert!(RegisterIndex::from_address(5).is_none());
        // 0 is documented by name, yet its contents are opaque.
        let register = RegisterIndex::from_address(0).unwrap();
        assert_eq!(register.data_type(), None);
        assert_eq!(register.word_count(), 1);
    }

    #[test]
    fn lookup_past_the_last_address_does_not_panic() {
        assert!(RegisterIndex::from_address(u16::MAX).is_none());
    }

    #[test]
    fn name_lookup_returns_first_match() {
        let register = RegisterIndex::from_name("Suction Pressure").unwrap();
        assert_eq!(register.address(), 203);
        assert!(RegisterIndex::from_name("No Such Register").is_none());
    }

    #[test]
    fn word_counts_follow_the_data_type() {
        assert_eq!(RegisterIndex::from_address(92).unwrap().word_count(), 12);
        assert_eq!(RegisterIndex::from_address(1146).unwrap().word_count(), 2);
        assert_eq!(RegisterIndex::from_address(745).unwrap().word_count(), 1);
    }

    #[test]
    fn brine_codes_fall_back_to_unknown() {
        assert_eq!(EnumTable::BrineType.label(485), "Antifreeze");
        assert_eq!(EnumTable::BrineType.label(1), "Unknown");
    }

    #[test]
    fn words_serialize_big_endian() {
        assert_eq!(words_to_bytes(&[0x5465, 0x7374]), b"Test".to_vec());
    }
}
