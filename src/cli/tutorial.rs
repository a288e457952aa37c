//! CLI `tutorial` command.

use anyhow::Result;

use gabu_tutor::config::TutorConfig;
use gabu_tutor::tutorial::STEPS;

pub fn tutorial(config: TutorConfig, next: bool, skip: bool, reset: bool) -> Result<()> {
    let services = super::open_services(config)?;
    let tutorial = &services.tutorial;

    if reset {
        tutorial.reset()?;
    }
    if skip {
        tutorial.skip()?;
        println!("Tutorial skipped. Run `gabu tutorial --reset` to see it again.");
        return Ok(());
    }
    let step = if next {
        tutorial.advance()?
    } else {
        tutorial.current_step()?
    };

    match step {
        Some(step) => {
            let index = STEPS.iter().position(|s| s.id == step.id).unwrap_or(0);
            println!("Step {}/{}: {}", index + 1, STEPS.len(), step.title);
            println!("  {}", step.body);
            println!();
            println!("Run `gabu tutorial --next` to continue.");
        }
        None => println!("Tutorial complete."),
    }
    Ok(())
}
