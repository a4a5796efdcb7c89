/// Regional unit spellings mapped to their canonical abbreviation.
///
/// Keys are matched after lowercasing and trimming.
pub const UNIT_ALIASES: &[(&str, &str)] = &[
    ("gramas", "Grm"),
    ("gramos", "Grm"),
    ("gram", "Grm"),
    ("gms", "Grm"),
    ("mls", "Mls"),
    ("mililitros", "Mls"),
    ("cps", "Cps"),
    ("copos", "Cps"),
    ("copo", "Cp"),
    ("colher", "Cl"),
    ("colheres", "Cls"),
    ("colheres de sopa", "Cls Sopa"),
    ("colher de sopa", "Cl Sopa"),
    ("colher de sobremesa", "Cl SobreMs"),
    ("colheres de sobremesa", "Cls SobreMs"),
    ("colheres de cha", "Cls Chá"),
    ("colher de cha", "Cl Chá"),
    ("xicara", "Xca"),
    ("xicaras", "Xcas"),
    ("chicara", "Xca"),
    ("chicaras", "Xcas"),
    ("kilos", "Kgs"),
    ("kilo", "Kg"),
    ("quilo", "Kg"),
    ("quilos", "Kgs"),
    ("unit", "Unit"),
];

/// Look up the canonical abbreviation for a unit spelling.
pub fn canonical_unit(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    UNIT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}
