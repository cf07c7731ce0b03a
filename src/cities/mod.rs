//! Static directory of the cities Bosta serves: canonical English name,
//! Arabic name, known spelling aliases, and the carrier city code.
//!
//! Pure lookups over in-memory data; never calls the carrier.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityEntry {
    pub name: &'static str,
    pub name_ar: &'static str,
    pub aliases: &'static [&'static str],
    pub code: &'static str,
}

pub static CITIES: &[CityEntry] = &[
    CityEntry { name: "Cairo", name_ar: "القاهرة", aliases: &[], code: "EG-01" },
    CityEntry { name: "Alexandria", name_ar: "الإسكندرية", aliases: &[], code: "EG-02" },
    CityEntry { name: "North Coast", name_ar: "الساحل الشمالي", aliases: &[], code: "EG-03" },
    CityEntry { name: "Behira", name_ar: "البحيرة", aliases: &["Beheira"], code: "EG-04" },
    CityEntry { name: "Dakahlia", name_ar: "الدقهلية", aliases: &[], code: "EG-05" },
    CityEntry { name: "El Kalioubia", name_ar: "القليوبية", aliases: &["Qalyubia"], code: "EG-06" },
    CityEntry { name: "Gharbia", name_ar: "الغربية", aliases: &[], code: "EG-07" },
    CityEntry { name: "Kafr Alsheikh", name_ar: "كفر الشيخ", aliases: &["Kafr Al-Sheikh"], code: "EG-08" },
    CityEntry { name: "Monufia", name_ar: "المنوفية", aliases: &["Menofia"], code: "EG-09" },
    CityEntry { name: "Sharqia", name_ar: "الشرقية", aliases: &[], code: "EG-10" },
    CityEntry { name: "Ismailia", name_ar: "الإسماعيلية", aliases: &["Isamilia"], code: "EG-11" },
    CityEntry { name: "Suez", name_ar: "السويس", aliases: &[], code: "EG-12" },
    CityEntry { name: "Port Said", name_ar: "بور سعيد", aliases: &[], code: "EG-13" },
    CityEntry { name: "Damietta", name_ar: "دمياط", aliases: &[], code: "EG-14" },
    CityEntry { name: "Fayoum", name_ar: "الفيوم", aliases: &["Faiyum"], code: "EG-15" },
    CityEntry { name: "Bani Suif", name_ar: "بني سويف", aliases: &["Beni Suef"], code: "EG-16" },
    CityEntry { name: "Assuit", name_ar: "أسيوط", aliases: &["Asyut"], code: "EG-17" },
    CityEntry { name: "Sohag", name_ar: "سوهاج", aliases: &[], code: "EG-18" },
    CityEntry { name: "Menya", name_ar: "المنيا", aliases: &["Minya"], code: "EG-19" },
    CityEntry { name: "Qena", name_ar: "قنا", aliases: &[], code: "EG-20" },
    CityEntry { name: "Aswan", name_ar: "أسوان", aliases: &[], code: "EG-21" },
    CityEntry { name: "Luxor", name_ar: "الأقصر", aliases: &[], code: "EG-22" },
    CityEntry { name: "Red Sea", name_ar: "البحر الأحمر", aliases: &[], code: "EG-23" },
    CityEntry { name: "New Valley", name_ar: "الوادى الجديد", aliases: &[], code: "EG-24" },
    CityEntry { name: "Giza", name_ar: "الجيزة", aliases: &[], code: "EG-25" },
    CityEntry { name: "South Sinai", name_ar: "جنوب سيناء", aliases: &[], code: "EG-26" },
    CityEntry { name: "North Sinai", name_ar: "شمال سيناء", aliases: &[], code: "EG-27" },
    CityEntry { name: "Matrouh", name_ar: "مرسى مطروح", aliases: &[], code: "EG-28" },
];

/// Resolve any accepted spelling of a city to its directory entry.
///
/// Lookup order: exact canonical, exact Arabic, exact alias, then
/// case-insensitive canonical and case-insensitive alias. First match wins;
/// no fuzzy or partial matching. Empty input never matches.
pub fn normalize(name: &str) -> Option<&'static CityEntry> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    if let Some(entry) = CITIES.iter().find(|c| c.name == name) {
        return Some(entry);
    }

    if let Some(entry) = CITIES.iter().find(|c| c.name_ar == name) {
        return Some(entry);
    }

    if let Some(entry) = CITIES.iter().find(|c| c.aliases.contains(&name)) {
        return Some(entry);
    }

    if let Some(entry) = CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
        return Some(entry);
    }

    CITIES
        .iter()
        .find(|c| c.aliases.iter().any(|a| a.eq_ignore_ascii_case(name)))
}

/// Carrier city code for any accepted spelling, or `None` for unknown cities.
pub fn code_for(name: &str) -> Option<&'static str> {
    normalize(name).map(|entry| entry.code)
}
