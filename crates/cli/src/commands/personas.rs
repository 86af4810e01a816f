//! `palaver personas` — List conversation styles.

use palaver_core::Persona;

use super::load_config_or_default;

pub fn run() {
    let default_persona = load_config_or_default().default_persona;

    println!("🎭 Personas");
    println!("===========");
    println!();
    for persona in Persona::ALL {
        println!(
            "  {:<10} {}{}",
            persona.as_str(),
            persona.description(),
            default_marker(persona, default_persona)
        );
    }
    println!();
    println!("  Select with `palaver chat --persona <name>` or `/persona <name>` in chat.");
}

fn default_marker(persona: Persona, configured: Persona) -> &'static str {
    if persona == configured { " (default)" } else { "" }
}
