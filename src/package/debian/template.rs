//! Templates for files placed into the Debian staging tree.

/// DEBIAN/control rendered per package.
pub const CONTROL_TEMPLATE: &str = "\
Package: {{package}}
Version: {{version}}
Section: utils
Priority: optional
Architecture: {{arch}}
Maintainer: {{maintainer}}
Description: {{description}}
";

/// Launcher installed beside the binary; the bin-path symlink points here.
pub const WRAPPER_TEMPLATE: &str = "\
#!/bin/sh
# Keeps tools shipped in the install prefix ahead of the system path.
GINDIR=\"$(dirname \"$(readlink -f \"$0\")\")\"
PATH=\"$GINDIR:$PATH\"
export PATH
exec \"$GINDIR/{{binary}}\" \"$@\"
";

/// usr/share/doc copyright stub.
pub const COPYRIGHT_TEMPLATE: &str = "\
{{package}} is distributed under the terms in the LICENSE file of the
source repository.

Maintainer: {{maintainer}}
";

/// Minimal Debian changelog; gzipped into the doc directory.
pub const CHANGELOG_TEMPLATE: &str = "\
{{package}} ({{version}}) unstable; urgency=medium

  * Release {{version}} (build {{build}}, commit {{commit}}).

 -- {{maintainer}}
";
