use super::entities::Mercenary;

// Static reference data for the mercenaries page. It never
// changes at runtime, so it lives here rather than in any
// of the stores.
pub static MERCENARIES: [Mercenary; 10] = [
  Mercenary { id: "1", name: "Wolf", image: "/assets/merc-wolf.jpg", role: "Assault" },
  Mercenary { id: "2", name: "Vipers", image: "/assets/merc-vipers.jpg", role: "Sniper" },
  Mercenary { id: "3", name: "Sisterhood", image: "/assets/merc-sisterhood.jpg", role: "Medic" },
  Mercenary { id: "4", name: "Black Mamba", image: "/assets/merc-blackmamba.jpg", role: "Scout" },
  Mercenary { id: "5", name: "Arch Honorary", image: "/assets/merc-archhonorary.jpg", role: "Tank" },
  Mercenary { id: "6", name: "Desperado", image: "/assets/merc-desperado.jpg", role: "Engineer" },
  Mercenary { id: "7", name: "Ronin", image: "/assets/merc-ronin.jpg", role: "Samurai" },
  Mercenary { id: "8", name: "Dean", image: "/assets/merc-dean.jpg", role: "Specialist" },
  Mercenary { id: "9", name: "Thoth", image: "/assets/merc-thoth.jpg", role: "Guardian" },
  Mercenary { id: "10", name: "SFG", image: "/assets/merc-sfg.jpg", role: "Special Forces Group" }
];

pub fn all() -> Vec<Mercenary> {
  MERCENARIES.to_vec()
}
