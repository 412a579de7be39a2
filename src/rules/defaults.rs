//! Recommended rule set
//!
//! Categories are listed in evaluation order. A block pattern in an earlier
//! category wins over everything after it. All patterns are compiled
//! case-insensitively; `(?-i:...)` pins case where it matters.

use crate::rules::CategoryRules;

/// Default bypass keyword
pub const BYPASS_KEYWORD: &str = "SECURITY_OVERRIDE";

pub const FILE_DESTRUCTION: CategoryRules = CategoryRules::new(
    "file_destruction",
    &[
        // rm targeting / or /*
        r"\brm\s+(.*\s)?/\*?(\s|$)",
        r"\brm\s+.*--no-preserve-root",
        // rm targeting the home directory itself
        r"\brm\s+(-\S+\s+)*(~|\$HOME)/?(\s|$)",
        r"\bshred\b",
        r"\bdd\s+.*\bof=/dev/(sd|hd|vd|xvd|nvme|disk|mmcblk)",
    ],
    &[
        r"\brm\s+(.*\s)?-[a-z]*[rf]",
        r"\bfind\b.*\s-delete\b",
        r"\btruncate\s+",
        r"\bunlink\s+",
    ],
    "This command can permanently delete files or directories",
);

pub const SYSTEM_MODIFICATION: CategoryRules = CategoryRules::new(
    "system_modification",
    &[
        r"\bchmod\s+(-\S+\s+)*[0-7]?777\s+/",
        r"\bchown\s+(-\S+\s+)*\S+\s+/(\s|$)",
        r">\s*/etc/(passwd|shadow|sudoers|hosts|group)\b",
    ],
    &[
        r"\bchmod\s+",
        r"\bchown\s+",
        r"\bchgrp\s+",
        r"\bchattr\s+",
        r"\bsystemctl\s+(stop|disable|mask|restart)\b",
        r"\bcrontab\b",
    ],
    "This command can modify critical system files or permissions",
);

pub const PROCESS_CONTROL: CategoryRules = CategoryRules::new(
    "process_control",
    &[
        // kill every process, or pid 1
        r"\bkill\s+(-\S+\s+)*-1\s*$",
        r"\bkill\s+(-\S+\s+)*1\s*$",
        r"\b(killall|pkill)\s+(-\S+\s+)*(init|systemd|launchd)\b",
        r"^\s*(sudo\s+)?(shutdown|reboot|halt|poweroff)\b",
    ],
    &[r"\bkill\s+", r"\bkillall\s+", r"\bpkill\s+"],
    "This command can terminate processes or affect system stability",
);

pub const NETWORK_SECURITY: CategoryRules = CategoryRules::new(
    "network_security",
    &[
        r"\b(curl|wget)\b.*\|\s*(sudo\s+)?(ba|z|da)?sh\b",
        r"\b(curl|wget)\b.*\|\s*python",
        r"\b(nc|ncat|netcat)\s+.*-[a-z]*e\s",
        r"/dev/tcp/",
    ],
    &[
        r"\bcurl\s+",
        r"\bwget\s+",
        r"\b(nc|ncat|netcat)\s+",
        r"\bssh\s+",
        r"\bscp\s+",
        r"\brsync\s+.*:",
        r"\bftp\s+",
        r"\btelnet\s+",
    ],
    "This command can establish network connections or download content",
);

pub const PERMISSION_ESCALATION: CategoryRules = CategoryRules::new(
    "permission_escalation",
    &[
        r"\bsudo\s+(-\S+\s+)*su\b",
        r"\bsudo\s+(-\S+\s+)*(ba|z|da)?sh\b",
        r"\bsudo\s+-[a-z]*[is]\b",
        // setuid/setgid bits
        r"\bchmod\s+(-\S+\s+)*[ugoa]*\+s\b",
        r"\bchmod\s+(-\S+\s+)*[0-7]?[2-7][0-7]{3}\s",
    ],
    &[
        r"\bsudo\s+",
        r"\bsu\s+",
        r"\bsu\s*$",
        r"\bdoas\s+",
        r"\bvisudo\b",
        r"\busermod\s+",
    ],
    "This command can elevate privileges or modify security settings",
);

pub const DISK_OPERATIONS: CategoryRules = CategoryRules::new(
    "disk_operations",
    &[
        r"\bmkfs(\.\w+)?\s+",
        r"\bfdisk\s+/dev/",
        r"\bparted\s+/dev/",
        r"\bwipefs\s+",
        r"\bsgdisk\s+",
        r">\s*/dev/(sd|hd|vd|xvd|nvme|disk)",
    ],
    &[
        r"\bmount\s+",
        r"\bumount\s+",
        r"\bfsck\b",
        r"\bdiskutil\s+",
        r"\blosetup\s+",
    ],
    "This command can modify disk partitions or filesystems",
);

pub const ARCHIVE_OPERATIONS: CategoryRules = CategoryRules::new(
    "archive_operations",
    &[
        r"\btar\s+.*\s-C\s*/(\s|$)",
        r"\btar\s+.*(--absolute-names|\s-[a-zA-Z]*(?-i:P))",
        r"\bunzip\s+.*\s-d\s*/(\s|$)",
    ],
    &[
        r"\btar\s+-?[a-z]*x",
        r"\bunzip\s+",
        r"\b7z\s+x\b",
        r"\bunrar\s+",
    ],
    "This command can extract files in potentially dangerous ways",
);

pub const SYMLINK_ATTACKS: CategoryRules = CategoryRules::new(
    "symlink_attacks",
    &[
        r"\bln\s+(-\S+\s+)*(\.\./)+(etc|bin|sbin|usr|root|boot|var)\b",
        r"\bln\s+(-\S+\s+)*/(etc|bin|sbin|usr|boot|root|var|sys|proc)\b",
    ],
    &[r"\bln\s+-[a-z]*s"],
    "This command can create symbolic links outside the current directory",
);

pub const ENVIRONMENT_MANIPULATION: CategoryRules = CategoryRules::new(
    "environment_manipulation",
    &[
        r"\bLD_PRELOAD\s*=",
        r"\bLD_LIBRARY_PATH\s*=",
        r"\bDYLD_INSERT_LIBRARIES\s*=",
        r#"(?-i:\bPATH)\s*=\s*["']?(/tmp|/var/tmp|\.)"#,
    ],
    &[r"\bexport\s+\w+=", r"\bunset\s+"],
    "This command can modify environment variables affecting system behavior",
);

pub const CODE_EXECUTION: CategoryRules = CategoryRules::new(
    "code_execution",
    &[
        r"\beval\s",
        r"\bsource\s+/tmp/",
        r"(^|\s)\.\s+/tmp/",
        r"\|\s*(sudo\s+)?(ba|z|da|k)?sh\b",
        r"\bexec\s+(ba|z)?sh\b",
    ],
    &[
        r"\b(bash|sh|zsh)\s+-c\s",
        r"\bpython[0-9.]*\s+-c\s",
        r"\bnode\s+-e\s",
        r"\bperl\s+-e\s",
        r"\bruby\s+-e\s",
        r"\bsource\s+",
        r"\bexec\s+",
    ],
    "This command can execute arbitrary code",
);

/// Recommended categories in evaluation order
pub const RECOMMENDED_CATEGORIES: &[CategoryRules] = &[
    FILE_DESTRUCTION,
    SYSTEM_MODIFICATION,
    PROCESS_CONTROL,
    NETWORK_SECURITY,
    PERMISSION_ESCALATION,
    DISK_OPERATIONS,
    ARCHIVE_OPERATIONS,
    SYMLINK_ATTACKS,
    ENVIRONMENT_MANIPULATION,
    CODE_EXECUTION,
];

/// Sensitive system prefixes
pub const BLOCKED_PATHS: &[&str] = &[
    "/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/usr/lib", "/boot", "/sys", "/proc",
    "/lib", "/root", "/System",
];

/// Commands allowed to reference paths outside the working directory
pub const READ_ONLY_OPS_OUTSIDE_CWD: &[&str] = &[
    "ls", "cat", "head", "tail", "less", "more", "grep", "rg", "find", "stat", "file", "wc",
    "du", "df", "diff", "tree", "which", "git log", "git status", "git diff", "git show",
];

/// Commands that need confirmation when they reference paths outside the working directory
pub const CONFIRM_OPS_OUTSIDE_CWD: &[&str] = &[
    "rm", "mv", "cp", "chmod", "chown", "ln", "mkdir", "rmdir", "touch", "tee", "dd",
    "truncate", "rsync", "tar", "unzip",
];
