//! Static learning content: e-waste types, global figures, facts, FAQ and
//! the quick-start guide.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EwasteType {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub facts: &'static [&'static str],
    pub recycling_tip: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalStat {
    pub stat: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuideStep {
    pub title: &'static str,
    pub description: &'static str,
}

/// The whole education page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EducationContent {
    pub ewaste_types: &'static [EwasteType],
    pub global_impact: &'static [GlobalStat],
    pub did_you_know: &'static [&'static str],
    pub faq: &'static [FaqEntry],
    pub quick_start: &'static [GuideStep],
}

pub const EWASTE_TYPES: &[EwasteType] = &[
    EwasteType {
        id: "batteries",
        title: "Batteries & Power Supplies",
        description: "Contains heavy metals like lead, cadmium, and mercury",
        facts: &[
            "A single battery can contaminate up to 600,000 liters of water",
            "95% of battery materials can be recycled",
            "Lithium-ion batteries can explode if improperly disposed",
        ],
        recycling_tip: "Never throw batteries in regular trash. Use designated battery recycling bins or return them to electronics stores.",
    },
    EwasteType {
        id: "smartphones",
        title: "Smartphones & Tablets",
        description: "Contains precious metals like gold, silver, and rare earth elements",
        facts: &[
            "1 ton of smartphones contains more gold than 1 ton of gold ore",
            "Only 20% of smartphones are recycled globally",
            "A smartphone contains over 40 elements from the periodic table",
        ],
        recycling_tip: "Erase personal data before recycling. Many manufacturers offer trade-in programs that refurbish or properly recycle old devices.",
    },
    EwasteType {
        id: "computers",
        title: "Computers & Laptops",
        description: "Contains harmful substances like lead, mercury, and flame retardants",
        facts: &[
            "E-waste is the fastest growing waste stream in the world",
            "A single computer monitor contains up to 4kg of lead",
            "Recycling 1 million laptops saves energy equal to powering 3,657 US homes for a year",
        ],
        recycling_tip: "Remove hard drives for data security. Donate working computers to schools or charities, or take them to certified e-waste recyclers.",
    },
    EwasteType {
        id: "displays",
        title: "TVs & Monitors",
        description: "Old CRT displays contain toxic phosphor and lead in glass",
        facts: &[
            "LCD screens contain mercury in their backlights",
            "A CRT TV can contain 4-8 pounds of lead",
            "Screen recycling recovers aluminum, copper, and precious metals",
        ],
        recycling_tip: "Never break or dismantle screens yourself. Contact local recycling programs that handle displays safely.",
    },
];

pub const GLOBAL_IMPACT: &[GlobalStat] = &[
    GlobalStat {
        stat: "53.6M",
        label: "Metric tons of e-waste generated in 2019",
    },
    GlobalStat {
        stat: "17.4%",
        label: "Of e-waste properly recycled globally",
    },
    GlobalStat {
        stat: "$57B",
        label: "Worth of recoverable materials lost annually",
    },
    GlobalStat {
        stat: "5-7%",
        label: "Annual growth rate of e-waste",
    },
];

pub const DID_YOU_KNOW: &[&str] = &[
    "E-waste represents 2% of trash in landfills but 70% of toxic waste",
    "The US generates more e-waste per capita than any other country",
    "Africa and Asia are often dumping grounds for e-waste from developed nations",
    "Informal e-waste recycling exposes workers to toxic chemicals",
    "Proper recycling can recover 98% of materials from electronics",
];

pub const FAQ: &[FaqEntry] = &[
    FaqEntry {
        question: "What counts as e-waste?",
        answer: "E-waste includes any electronic device with a plug, battery, or circuit board. This includes computers, phones, TVs, appliances, toys, and even LED light bulbs. If it has electronic components, it's e-waste.",
    },
    FaqEntry {
        question: "Why can't I just throw electronics in the trash?",
        answer: "Electronics contain toxic materials like lead, mercury, cadmium, and flame retardants. In landfills these toxins can leach into soil and groundwater. E-waste also contains valuable materials that should be recovered and reused.",
    },
    FaqEntry {
        question: "What happens to recycled electronics?",
        answer: "Certified recyclers dismantle electronics to separate plastics, metals, and glass. Precious metals are recovered and refined, hazardous materials are disposed of safely, and many components are refurbished and resold.",
    },
    FaqEntry {
        question: "How do I protect my data before recycling?",
        answer: "Perform a factory reset and remove memory and SIM cards. For computers, use data wiping software or physically remove the drive and have it destroyed by a data destruction service.",
    },
    FaqEntry {
        question: "Can I get money for my old electronics?",
        answer: "Often, yes. Manufacturer and retailer trade-in programs pay for working devices, and some recyclers pay for scrap with recoverable metals.",
    },
];

pub const QUICK_START: &[GuideStep] = &[
    GuideStep {
        title: "Classify Your E-Waste",
        description: "Upload a photo of your electronic waste to get instant AI-powered identification and recycling guidance.",
    },
    GuideStep {
        title: "Find Recycling Centers",
        description: "Locate certified e-waste collection centers near you with contact info, opening hours, and directions.",
    },
    GuideStep {
        title: "Track Your Impact",
        description: "Monitor your environmental contribution with CO₂ saved, energy conserved, and unlock achievements.",
    },
    GuideStep {
        title: "Learn & Educate",
        description: "Explore the education hub to understand e-waste types, hazards, and best recycling practices.",
    },
];

/// All education content.
#[must_use]
pub fn content() -> EducationContent {
    EducationContent {
        ewaste_types: EWASTE_TYPES,
        global_impact: GLOBAL_IMPACT,
        did_you_know: DID_YOU_KNOW,
        faq: FAQ,
        quick_start: QUICK_START,
    }
}

/// The "did you know" fact at `index`, wrapping around.
#[must_use]
pub fn fact(index: usize) -> &'static str {
    DID_YOU_KNOW[index % DID_YOU_KNOW.len()]
}
