// Prints the IntegrationRoute CRD manifest to stdout, for piping into
// kubectl or checking into deployment manifests.

use kube::CustomResourceExt;

use operator::crd::IntegrationRoute;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&IntegrationRoute::crd())?);
    Ok(())
}
